//! Drug interaction check run before a plan is created.
//!
//! The only rule is a single hardcoded pair: a patient already on an active warfarin plan must
//! not be given aspirin. There is no rule data beyond this pair.

use crate::constants::{
    CONFLICTING_CANDIDATE_FRAGMENT, CONFLICTING_EXISTING_FRAGMENT, WARFARIN_ASPIRIN_MESSAGE,
};
use crate::models::Medication;
use crate::store::{DocumentStore, PlanFilter};
use crate::{CdssResult, NonEmptyText};

/// Outcome of an interaction check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractionResult {
    pub interacts: bool,
    pub message: Option<String>,
}

impl InteractionResult {
    fn none() -> Self {
        Self::default()
    }

    fn critical(message: &str) -> Self {
        Self {
            interacts: true,
            message: Some(message.to_string()),
        }
    }
}

fn name_contains(name: &str, fragment: &str) -> bool {
    name.to_lowercase().contains(fragment)
}

/// Applies the warfarin/aspirin rule to already-resolved medication names.
pub fn evaluate_interaction<'a>(
    active_names: impl IntoIterator<Item = &'a str>,
    candidate_name: &str,
) -> InteractionResult {
    let has_conflicting_existing = active_names
        .into_iter()
        .any(|name| name_contains(name, CONFLICTING_EXISTING_FRAGMENT));
    let candidate_is_conflicting = name_contains(candidate_name, CONFLICTING_CANDIDATE_FRAGMENT);

    if has_conflicting_existing && candidate_is_conflicting {
        InteractionResult::critical(WARFARIN_ASPIRIN_MESSAGE)
    } else {
        InteractionResult::none()
    }
}

/// Resolves the medications of every active plan held by `patient_id`.
///
/// A plan pointing at a medication that no longer exists is skipped with a warning.
pub fn active_medications(
    store: &DocumentStore,
    patient_id: &NonEmptyText,
) -> CdssResult<Vec<Medication>> {
    let plans = store.find_plans(PlanFilter::active_for(patient_id))?;

    let mut medications = Vec::with_capacity(plans.len());
    for plan in plans {
        match store.find_medication(&plan.medication)? {
            Some(medication) => medications.push(medication),
            None => tracing::warn!(
                "plan {} references missing medication {}",
                plan.id,
                plan.medication
            ),
        }
    }
    Ok(medications)
}

/// Checks `candidate` against the patient's active medications.
///
/// # Errors
///
/// Store lookup failures are returned unchanged; nothing is retried.
pub fn check_drug_interactions(
    store: &DocumentStore,
    candidate: &Medication,
    patient_id: &NonEmptyText,
) -> CdssResult<InteractionResult> {
    check_candidate_name(store, candidate.name.as_str(), patient_id)
}

/// Same as [`check_drug_interactions`] for a medication that may not be stored yet.
pub fn check_candidate_name(
    store: &DocumentStore,
    candidate_name: &str,
    patient_id: &NonEmptyText,
) -> CdssResult<InteractionResult> {
    tracing::info!(
        "checking interactions for medication '{}' and patient '{}'",
        candidate_name,
        patient_id
    );

    let active = active_medications(store, patient_id)?;
    Ok(evaluate_interaction(
        active.iter().map(|m| m.name.as_str()),
        candidate_name,
    ))
}

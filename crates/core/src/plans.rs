//! Medication plan service.
//!
//! Orchestrates a plan submission: find-or-create the patient and the medication, run the
//! interaction check, and only then write the plan. Also provides the populated plan listing.
//!
//! There is no rollback. If the plan write fails (or the interaction check refuses the plan)
//! after a patient or medication was created, those records stay.

use crate::constants::PLACEHOLDER_PATIENT_PREFIX;
use crate::interactions::{self, InteractionResult};
use crate::models::{Medication, MedicationPlan, Patient, PatientSummary, PopulatedPlan};
use crate::store::{DocumentStore, PlanFilter};
use crate::validation::{AddPlanInput, ValidatedPlanInput};
use crate::{CdssError, CdssResult, NonEmptyText};
use std::sync::Arc;

/// Plan operations over an injected document store. Cheap to clone.
#[derive(Clone, Debug)]
pub struct PlanService {
    store: Arc<DocumentStore>,
}

impl PlanService {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Validates and stores a new medication plan.
    ///
    /// # Errors
    ///
    /// - [`CdssError::MissingRequiredFields`] / [`CdssError::InvalidInput`] before anything is
    ///   written.
    /// - [`CdssError::InteractionDetected`] carrying the interaction message; the plan is not
    ///   written.
    /// - Any store error, unchanged.
    pub fn add_plan(&self, input: AddPlanInput) -> CdssResult<MedicationPlan> {
        let input = input.validate()?;

        let patient = self.find_or_create_patient(&input.patient_id)?;
        let medication = self.find_or_create_medication(&input)?;

        let InteractionResult { interacts, message } =
            interactions::check_drug_interactions(&self.store, &medication, &patient.id)?;
        if interacts {
            let message = message.unwrap_or_default();
            tracing::warn!(
                "plan for patient '{}' refused: {}",
                patient.id,
                message
            );
            return Err(CdssError::InteractionDetected(message));
        }

        let plan = MedicationPlan::new(patient.id, medication.id, input.schedule);
        self.store.insert_plan(&plan)?;
        tracing::info!(
            "created plan {} for patient '{}' with medication '{}'",
            plan.id,
            plan.patient,
            medication.name
        );

        Ok(plan)
    }

    /// Runs the interaction check for a medication name without writing anything.
    pub fn check_interactions(
        &self,
        medication_name: &NonEmptyText,
        patient_id: &NonEmptyText,
    ) -> CdssResult<InteractionResult> {
        match self.store.find_medication_by_name(medication_name)? {
            Some(medication) => {
                interactions::check_drug_interactions(&self.store, &medication, patient_id)
            }
            None => interactions::check_candidate_name(
                &self.store,
                medication_name.as_str(),
                patient_id,
            ),
        }
    }

    /// Returns every plan with its patient and medication resolved, oldest first.
    ///
    /// A dangling reference is reported as `None` and logged rather than failing the listing.
    pub fn list_plans(&self) -> CdssResult<Vec<PopulatedPlan>> {
        let plans = self.store.find_plans(PlanFilter::default())?;

        let mut populated = Vec::with_capacity(plans.len());
        for plan in plans {
            let patient = self.store.find_patient(&plan.patient)?;
            if patient.is_none() {
                tracing::warn!("plan {} references missing patient '{}'", plan.id, plan.patient);
            }
            let medication = self.store.find_medication(&plan.medication)?;
            if medication.is_none() {
                tracing::warn!(
                    "plan {} references missing medication {}",
                    plan.id,
                    plan.medication
                );
            }

            populated.push(PopulatedPlan {
                id: plan.id,
                patient: patient.map(PatientSummary::from),
                medication,
                schedule: plan.schedule,
                doses_taken: plan.doses_taken,
                is_active: plan.is_active,
                created_at: plan.created_at,
                updated_at: plan.updated_at,
            });
        }

        Ok(populated)
    }

    /// Finds the patient, or creates one with a placeholder display name.
    ///
    /// The placeholder stands in for real patient registration, which this system does not
    /// have. Do not build on it.
    fn find_or_create_patient(&self, id: &NonEmptyText) -> CdssResult<Patient> {
        if let Some(patient) = self.store.find_patient(id)? {
            return Ok(patient);
        }

        let name = format!("{}{}", PLACEHOLDER_PATIENT_PREFIX, id);
        tracing::info!("creating placeholder patient '{}'", id);
        self.store
            .insert_patient_or_get(Patient::new(id.clone(), name))
    }

    /// Finds the medication by exact name, or creates it from the submission.
    ///
    /// An existing medication is returned as stored: the submitted dosage, type and
    /// ingredients only apply to a new record.
    fn find_or_create_medication(&self, input: &ValidatedPlanInput) -> CdssResult<Medication> {
        if let Some(medication) = self.store.find_medication_by_name(&input.medication_name)? {
            return Ok(medication);
        }

        tracing::info!("creating medication '{}'", input.medication_name);
        self.store.insert_medication_or_get(Medication::new(
            input.medication_name.clone(),
            input.dosage.clone(),
            input.medication_type,
            input.ingredients.clone(),
        ))
    }
}

//! Stored document shapes for the three collections.
//!
//! Field names follow the JSON the API has always returned (`_id`, camelCase, `createdAt`), so
//! documents can be served as stored without a second naming layer inside the core.

use crate::{CdssError, CdssResult, NonEmptyText};
use cdss_uuid::DocumentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A patient, keyed by an identifier supplied from outside the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(rename = "_id")]
    pub id: NonEmptyText,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    pub fn new(id: NonEmptyText, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Medication kind. Only traditional Chinese medicine entries carry ingredients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MedicationType {
    Western,
    Tcm,
}

impl MedicationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MedicationType::Western => "western",
            MedicationType::Tcm => "tcm",
        }
    }
}

impl fmt::Display for MedicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MedicationType {
    type Err = CdssError;

    fn from_str(s: &str) -> CdssResult<Self> {
        match s.trim() {
            "western" => Ok(MedicationType::Western),
            "tcm" => Ok(MedicationType::Tcm),
            other => Err(CdssError::InvalidInput(format!(
                "medication type must be 'western' or 'tcm', got: '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: NonEmptyText,
    pub dosage: NonEmptyText,
    #[serde(rename = "type")]
    pub medication_type: MedicationType,
    /// `None` is stored as an absent key, never as `null` or `[]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Medication {
    /// Builds a new medication document with a fresh id.
    ///
    /// Ingredients are normalised here so no stored medication can break the tcm-only rule:
    /// western medications drop any supplied list, tcm medications keep the trimmed non-empty
    /// entries in their original order.
    pub fn new(
        name: NonEmptyText,
        dosage: NonEmptyText,
        medication_type: MedicationType,
        ingredients: Option<Vec<String>>,
    ) -> Self {
        let ingredients = match medication_type {
            MedicationType::Western => None,
            MedicationType::Tcm => ingredients.map(|list| {
                list.into_iter()
                    .filter_map(|i| NonEmptyText::new(i).ok().map(NonEmptyText::into_inner))
                    .collect()
            }),
        };
        let now = Utc::now();

        Self {
            id: DocumentId::new(),
            name,
            dosage,
            medication_type,
            ingredients,
            created_at: now,
            updated_at: now,
        }
    }
}

fn default_active() -> bool {
    true
}

/// Join document linking one patient to one medication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationPlan {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub patient: NonEmptyText,
    pub medication: DocumentId,
    pub schedule: NonEmptyText,
    #[serde(default)]
    pub doses_taken: Vec<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MedicationPlan {
    /// A freshly created plan: no doses recorded yet and active.
    pub fn new(patient: NonEmptyText, medication: DocumentId, schedule: NonEmptyText) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentId::new(),
            patient,
            medication,
            schedule,
            doses_taken: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The patient fields exposed in a plan listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientSummary {
    #[serde(rename = "_id")]
    pub id: NonEmptyText,
    pub name: String,
}

impl From<Patient> for PatientSummary {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
        }
    }
}

/// A plan with its references resolved. A reference whose document no longer exists is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedPlan {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub patient: Option<PatientSummary>,
    pub medication: Option<Medication>,
    pub schedule: NonEmptyText,
    pub doses_taken: Vec<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

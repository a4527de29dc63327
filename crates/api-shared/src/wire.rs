//! JSON request and response bodies of the REST API.
//!
//! Field names match what the browser client sends and reads (`patientId`, `_id`,
//! `dosesTaken`, ...). Timestamps are RFC 3339 strings in UTC with millisecond precision.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Body of `POST /api/medications/add`.
///
/// Every field is optional on the wire so a missing field is reported as a validation error
/// rather than a deserialisation failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPlanReq {
    #[schema(example = "p1")]
    pub patient_id: Option<String>,
    #[schema(example = "Warfarin")]
    pub medication_name: Option<String>,
    #[schema(example = "5mg")]
    pub dosage: Option<String>,
    /// `western` or `tcm`.
    #[serde(rename = "type")]
    #[schema(example = "western")]
    pub medication_type: Option<String>,
    /// Only kept for `tcm` medications.
    pub ingredients: Option<Vec<String>>,
    #[schema(example = "Once a day in the morning")]
    pub schedule: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanRes {
    #[serde(rename = "_id")]
    pub id: String,
    /// Patient identifier.
    pub patient: String,
    /// Medication document id.
    pub medication: String,
    pub schedule: String,
    pub doses_taken: Vec<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddPlanRes {
    pub message: String,
    pub plan: PlanRes,
}

/// Body of the 409 response when the interaction check refuses a plan.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InteractionRes {
    pub message: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientSummaryRes {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRes {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub dosage: String,
    #[serde(rename = "type")]
    pub medication_type: String,
    /// Absent for western medications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    pub created_at: String,
    pub updated_at: String,
}

/// A plan in the listing, with patient and medication resolved.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedPlanRes {
    #[serde(rename = "_id")]
    pub id: String,
    pub patient: Option<PatientSummaryRes>,
    pub medication: Option<MedicationRes>,
    pub schedule: String,
    pub doses_taken: Vec<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

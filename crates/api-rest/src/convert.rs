//! Conversions from core documents to wire types.

use api_shared::{MedicationRes, PatientSummaryRes, PlanRes, PopulatedPlanRes};
use cdss_core::{Medication, MedicationPlan, PatientSummary, PopulatedPlan};
use chrono::{DateTime, SecondsFormat, Utc};

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn timestamps(list: Vec<DateTime<Utc>>) -> Vec<String> {
    list.into_iter().map(timestamp).collect()
}

pub(crate) fn plan(plan: MedicationPlan) -> PlanRes {
    PlanRes {
        id: plan.id.to_string(),
        patient: plan.patient.into_inner(),
        medication: plan.medication.to_string(),
        schedule: plan.schedule.into_inner(),
        doses_taken: timestamps(plan.doses_taken),
        is_active: plan.is_active,
        created_at: timestamp(plan.created_at),
        updated_at: timestamp(plan.updated_at),
    }
}

fn patient_summary(patient: PatientSummary) -> PatientSummaryRes {
    PatientSummaryRes {
        id: patient.id.into_inner(),
        name: patient.name,
    }
}

fn medication(medication: Medication) -> MedicationRes {
    MedicationRes {
        id: medication.id.to_string(),
        name: medication.name.into_inner(),
        dosage: medication.dosage.into_inner(),
        medication_type: medication.medication_type.to_string(),
        ingredients: medication.ingredients,
        created_at: timestamp(medication.created_at),
        updated_at: timestamp(medication.updated_at),
    }
}

pub(crate) fn populated_plan(plan: PopulatedPlan) -> PopulatedPlanRes {
    PopulatedPlanRes {
        id: plan.id.to_string(),
        patient: plan.patient.map(patient_summary),
        medication: plan.medication.map(medication),
        schedule: plan.schedule.into_inner(),
        doses_taken: timestamps(plan.doses_taken),
        is_active: plan.is_active,
        created_at: timestamp(plan.created_at),
        updated_at: timestamp(plan.updated_at),
    }
}

//! Validation of plan submissions.
//!
//! Submissions arrive with every field optional. Validation happens before any write so a
//! rejected submission never leaves records behind.

use crate::models::MedicationType;
use crate::{CdssError, CdssResult, NonEmptyText};

/// A plan submission as received from a caller.
#[derive(Debug, Clone, Default)]
pub struct AddPlanInput {
    pub patient_id: Option<String>,
    pub medication_name: Option<String>,
    pub dosage: Option<String>,
    pub medication_type: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub schedule: Option<String>,
}

/// A plan submission whose required fields are present and whose type is known.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPlanInput {
    pub patient_id: NonEmptyText,
    pub medication_name: NonEmptyText,
    pub dosage: NonEmptyText,
    pub medication_type: MedicationType,
    pub ingredients: Option<Vec<String>>,
    pub schedule: NonEmptyText,
}

impl AddPlanInput {
    /// Checks presence of the required fields, then the medication type.
    ///
    /// # Errors
    ///
    /// - [`CdssError::MissingRequiredFields`] if any of patient id, medication name, dosage,
    ///   type or schedule is missing or blank.
    /// - [`CdssError::InvalidInput`] if the type is neither `western` nor `tcm`.
    pub fn validate(self) -> CdssResult<ValidatedPlanInput> {
        let required = |field: &Option<String>| {
            NonEmptyText::from_optional(field.as_deref())
                .map_err(|_| CdssError::MissingRequiredFields)
        };

        let patient_id = required(&self.patient_id)?;
        let medication_name = required(&self.medication_name)?;
        let dosage = required(&self.dosage)?;
        let medication_type = required(&self.medication_type)?;
        let schedule = required(&self.schedule)?;

        Ok(ValidatedPlanInput {
            patient_id,
            medication_name,
            dosage,
            medication_type: medication_type.as_str().parse()?,
            ingredients: self.ingredients,
            schedule,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> AddPlanInput {
        AddPlanInput {
            patient_id: Some("p1".into()),
            medication_name: Some("Warfarin".into()),
            dosage: Some("5mg".into()),
            medication_type: Some("western".into()),
            ingredients: None,
            schedule: Some("daily".into()),
        }
    }

    #[test]
    fn complete_input_validates() {
        let validated = complete().validate().unwrap();
        assert_eq!(validated.patient_id.as_str(), "p1");
        assert_eq!(validated.medication_type, MedicationType::Western);
    }

    #[test]
    fn each_required_field_is_checked() {
        let cases: [fn(&mut AddPlanInput); 5] = [
            |i| i.patient_id = None,
            |i| i.medication_name = Some("".into()),
            |i| i.dosage = Some("   ".into()),
            |i| i.medication_type = None,
            |i| i.schedule = None,
        ];

        for clear in cases {
            let mut input = complete();
            clear(&mut input);
            assert!(matches!(
                input.validate(),
                Err(CdssError::MissingRequiredFields)
            ));
        }
    }

    #[test]
    fn unknown_type_is_invalid_input() {
        let mut input = complete();
        input.medication_type = Some("herbal".into());
        let err = input.validate().unwrap_err();
        assert!(matches!(err, CdssError::InvalidInput(_)));
        assert!(err.is_validation());
    }

    #[test]
    fn missing_field_wins_over_unknown_type() {
        let mut input = complete();
        input.medication_type = Some("herbal".into());
        input.schedule = None;
        assert!(matches!(
            input.validate(),
            Err(CdssError::MissingRequiredFields)
        ));
    }
}

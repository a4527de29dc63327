//! Constants used throughout the CDSS core crate.
//!
//! Collection directory names, defaults and the fixed interaction rule text live here so the
//! store, the services and the tests agree on them.

/// Default document store directory when `CDSS_DATA_DIR` is not set.
pub const DEFAULT_DATA_DIR: &str = "cdss_data";

/// Default REST port when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 5000;

/// Collection directory for patient documents.
pub const PATIENTS_DIR_NAME: &str = "patients";

/// Collection directory for medication documents.
pub const MEDICATIONS_DIR_NAME: &str = "medications";

/// Name index inside the medications collection.
pub const MEDICATION_NAMES_DIR_NAME: &str = "names";

/// Collection directory for medication plan documents.
pub const PLANS_DIR_NAME: &str = "plans";

/// Prefix of the display name given to patients created implicitly by a plan submission.
pub const PLACEHOLDER_PATIENT_PREFIX: &str = "New Patient ";

/// Active medication name fragment that triggers the interaction rule.
pub const CONFLICTING_EXISTING_FRAGMENT: &str = "warfarin";

/// Candidate medication name fragment that triggers the interaction rule.
pub const CONFLICTING_CANDIDATE_FRAGMENT: &str = "aspirin";

pub const WARFARIN_ASPIRIN_MESSAGE: &str =
    "Critical interaction detected: Warfarin and Aspirin should not be taken together.";

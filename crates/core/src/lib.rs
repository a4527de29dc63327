//! # CDSS Core
//!
//! Core business logic for the medication plan service:
//! - Patient, medication and medication plan documents
//! - A file-backed JSON document store under the configured data directory
//! - The drug interaction check and the plan submission workflow
//!
//! **No API concerns**: HTTP servers, routing and response shapes belong in `api-rest` and
//! `api-shared`.

pub mod config;
pub mod constants;
pub mod error;
pub mod interactions;
pub mod models;
pub mod plans;
pub mod store;
pub mod validation;

pub use cdss_types::{NonEmptyText, TextError};
pub use cdss_uuid::DocumentId;
pub use config::CoreConfig;
pub use constants::DEFAULT_DATA_DIR;
pub use error::{CdssError, CdssResult};
pub use interactions::InteractionResult;
pub use models::{Medication, MedicationPlan, MedicationType, Patient, PatientSummary, PopulatedPlan};
pub use plans::PlanService;
pub use store::DocumentStore;
pub use validation::AddPlanInput;

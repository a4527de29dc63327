//! File-backed JSON document store.
//!
//! Each collection is a directory under the configured data directory. Documents with a
//! generated id are sharded by that id. Patients and the medication name index are keyed by
//! the SHA-256 digest of their natural key, so a key of any length or content maps to a short,
//! safe file name. The raw key is kept inside the document and checked on every read.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//!   patients/<h1>/<h2>/<sha256(patient id)>.json
//!   medications/<s1>/<s2>/<id>.json
//!   medications/names/<h1>/<h2>/<sha256(name)>   # contains the medication id
//!   plans/<s1>/<s2>/<id>.json
//! ```
//!
//! ## Natural keys
//!
//! Patient ids and medication names are unique. Both are claimed by writing a temporary file
//! and hard-linking it to its final name, which fails if the name already exists. A writer
//! that loses the claim re-reads the winner instead of failing.
//!
//! There is no cross-document transaction: a crash between writing a medication document and
//! claiming its name leaves an unreferenced medication file.

use crate::config::CoreConfig;
use crate::models::{Medication, MedicationPlan, Patient};
use crate::{CdssError, CdssResult, NonEmptyText};
use cdss_uuid::DocumentId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Which plans to return from [`DocumentStore::find_plans`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanFilter<'a> {
    pub patient: Option<&'a NonEmptyText>,
    pub active_only: bool,
}

impl<'a> PlanFilter<'a> {
    /// Active plans of one patient, as used by the interaction check.
    pub fn active_for(patient: &'a NonEmptyText) -> Self {
        Self {
            patient: Some(patient),
            active_only: true,
        }
    }

    fn matches(&self, plan: &MedicationPlan) -> bool {
        if self.active_only && !plan.is_active {
            return false;
        }
        self.patient.map_or(true, |p| &plan.patient == p)
    }
}

/// Handle to the document store. Opened once at startup and shared behind an `Arc`.
#[derive(Debug)]
pub struct DocumentStore {
    cfg: Arc<CoreConfig>,
}

impl DocumentStore {
    /// Opens the store, creating the collection directories if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CdssError::StorageDirCreation`] if a collection directory cannot be created.
    pub fn open(cfg: Arc<CoreConfig>) -> CdssResult<Self> {
        for dir in [
            cfg.patients_dir(),
            cfg.medication_names_dir(),
            cfg.plans_dir(),
        ] {
            fs::create_dir_all(&dir).map_err(CdssError::StorageDirCreation)?;
        }
        tracing::debug!("document store opened at {}", cfg.data_dir().display());
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    // ------------------------------------------------------------------------
    // Patients
    // ------------------------------------------------------------------------

    fn patient_path(&self, id: &NonEmptyText) -> PathBuf {
        keyed_path(&self.cfg.patients_dir(), id.as_str(), ".json")
    }

    /// # Errors
    ///
    /// Returns [`CdssError::KeyCollision`] if the document stored under the id's digest belongs
    /// to a different id.
    pub fn find_patient(&self, id: &NonEmptyText) -> CdssResult<Option<Patient>> {
        match read_document::<Patient>(&self.patient_path(id))? {
            Some(patient) if &patient.id != id => Err(CdssError::KeyCollision {
                collection: "patients",
                key: id.to_string(),
            }),
            found => Ok(found),
        }
    }

    /// Stores `patient` unless a patient with the same id already exists.
    ///
    /// Returns whichever document ends up stored under the id.
    pub fn insert_patient_or_get(&self, patient: Patient) -> CdssResult<Patient> {
        let path = self.patient_path(&patient.id);
        let raw = serde_json::to_vec_pretty(&patient).map_err(CdssError::Serialization)?;

        if create_exclusive(&path, &raw)? {
            return Ok(patient);
        }

        tracing::debug!("patient {} created concurrently, re-reading", patient.id);
        self.find_patient(&patient.id)?
            .ok_or_else(|| CdssError::DanglingIndex {
                collection: "patients",
                key: patient.id.into_inner(),
            })
    }

    // ------------------------------------------------------------------------
    // Medications
    // ------------------------------------------------------------------------

    fn medication_name_path(&self, name: &NonEmptyText) -> PathBuf {
        keyed_path(&self.cfg.medication_names_dir(), name.as_str(), "")
    }

    pub fn find_medication(&self, id: &DocumentId) -> CdssResult<Option<Medication>> {
        read_document(&id.sharded_file(&self.cfg.medications_dir()))
    }

    /// Looks a medication up by its exact (trimmed) name.
    ///
    /// # Errors
    ///
    /// Returns [`CdssError::DanglingIndex`] if the name is claimed but its document is gone, and
    /// [`CdssError::KeyCollision`] if the claim belongs to a medication with another name.
    pub fn find_medication_by_name(&self, name: &NonEmptyText) -> CdssResult<Option<Medication>> {
        let raw = match fs::read_to_string(self.medication_name_path(name)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CdssError::FileRead(e)),
        };
        let id = DocumentId::parse(raw.trim())?;

        match self.find_medication(&id)? {
            Some(medication) if &medication.name == name => Ok(Some(medication)),
            Some(_) => Err(CdssError::KeyCollision {
                collection: "medications",
                key: name.to_string(),
            }),
            None => Err(CdssError::DanglingIndex {
                collection: "medications",
                key: name.to_string(),
            }),
        }
    }

    /// Stores `medication` unless its name is already taken.
    ///
    /// The document is written before the name is claimed, so a claimed name always points at
    /// a readable document. A losing writer removes its own document and returns the winner.
    pub fn insert_medication_or_get(&self, medication: Medication) -> CdssResult<Medication> {
        let doc_path = medication.id.sharded_file(&self.cfg.medications_dir());
        write_document(&doc_path, &medication)?;

        let index_path = self.medication_name_path(&medication.name);
        if create_exclusive(&index_path, medication.id.to_string().as_bytes())? {
            return Ok(medication);
        }

        tracing::debug!(
            "medication '{}' created concurrently, re-reading",
            medication.name
        );
        if let Err(e) = fs::remove_file(&doc_path) {
            tracing::warn!(
                "failed to remove unclaimed medication {}: {}",
                doc_path.display(),
                e
            );
        }
        self.find_medication_by_name(&medication.name)?
            .ok_or_else(|| CdssError::DanglingIndex {
                collection: "medications",
                key: medication.name.into_inner(),
            })
    }

    // ------------------------------------------------------------------------
    // Medication plans
    // ------------------------------------------------------------------------

    pub fn insert_plan(&self, plan: &MedicationPlan) -> CdssResult<()> {
        write_document(&plan.id.sharded_file(&self.cfg.plans_dir()), plan)
    }

    pub fn find_plan(&self, id: &DocumentId) -> CdssResult<Option<MedicationPlan>> {
        read_document(&id.sharded_file(&self.cfg.plans_dir()))
    }

    /// Returns the plans matching `filter`, oldest first.
    ///
    /// Walks `plans/<s1>/<s2>/*.json`. Temporary files and anything that is not a `.json`
    /// document are ignored; a document that fails to parse is an error.
    pub fn find_plans(&self, filter: PlanFilter<'_>) -> CdssResult<Vec<MedicationPlan>> {
        let mut plans = Vec::new();

        for s1 in read_dirs(&self.cfg.plans_dir())? {
            for s2 in read_dirs(&s1)? {
                for entry in fs::read_dir(&s2).map_err(CdssError::FileRead)? {
                    let path = entry.map_err(CdssError::FileRead)?.path();
                    if !is_document_file(&path) {
                        continue;
                    }
                    if let Some(plan) = read_document::<MedicationPlan>(&path)? {
                        if filter.matches(&plan) {
                            plans.push(plan);
                        }
                    }
                }
            }
        }

        plans.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(plans)
    }
}

/// Lowercase hex SHA-256 digest of a natural key.
fn key_digest(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// `<dir>/<h1>/<h2>/<digest><extension>`, sharded on the first two digest bytes.
fn keyed_path(dir: &Path, key: &str, extension: &str) -> PathBuf {
    let digest = key_digest(key);
    dir.join(&digest[0..2])
        .join(&digest[2..4])
        .join(format!("{}{}", digest, extension))
}

fn is_document_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .map_or(true, |n| n.starts_with('.'));
    !hidden && path.is_file() && path.extension().is_some_and(|ext| ext == "json")
}

/// Lists the subdirectories of `dir`. A missing directory has none.
fn read_dirs(dir: &Path) -> CdssResult<Vec<PathBuf>> {
    let iter = match fs::read_dir(dir) {
        Ok(iter) => iter,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(CdssError::FileRead(e)),
    };

    let mut dirs = Vec::new();
    for entry in iter {
        let path = entry.map_err(CdssError::FileRead)?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    Ok(dirs)
}

fn read_document<T: DeserializeOwned>(path: &Path) -> CdssResult<Option<T>> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CdssError::FileRead(e)),
    };
    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|source| CdssError::Deserialization {
            path: path.to_path_buf(),
            source,
        })
}

/// Returns a hidden temporary path next to `path`, creating the parent directory.
///
/// Documents are written there first so readers never see a partial file.
fn temp_sibling(path: &Path) -> CdssResult<PathBuf> {
    let dir = path
        .parent()
        .ok_or_else(|| CdssError::InvalidStoragePath {
            path: path.to_path_buf(),
        })?;
    fs::create_dir_all(dir).map_err(CdssError::StorageDirCreation)?;
    Ok(dir.join(format!(".{}.tmp", DocumentId::new())))
}

fn write_document<T: Serialize>(path: &Path, document: &T) -> CdssResult<()> {
    let raw = serde_json::to_vec_pretty(document).map_err(CdssError::Serialization)?;
    let tmp = temp_sibling(path)?;

    fs::write(&tmp, &raw).map_err(CdssError::FileWrite)?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        CdssError::FileWrite(e)
    })
}

/// Creates `path` with `contents` only if it does not exist yet.
///
/// Returns `Ok(false)` when another writer already owns the name.
fn create_exclusive(path: &Path, contents: &[u8]) -> CdssResult<bool> {
    let tmp = temp_sibling(path)?;
    fs::write(&tmp, contents).map_err(CdssError::FileWrite)?;

    let linked = fs::hard_link(&tmp, path);
    if let Err(e) = fs::remove_file(&tmp) {
        tracing::warn!("failed to remove temporary file {}: {}", tmp.display(), e);
    }

    match linked {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(CdssError::FileWrite(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MedicationType;
    use tempfile::TempDir;

    fn text(s: &str) -> NonEmptyText {
        NonEmptyText::new(s).unwrap()
    }

    fn test_store(temp: &TempDir) -> DocumentStore {
        let cfg = CoreConfig::new(temp.path().to_path_buf()).expect("CoreConfig::new should succeed");
        DocumentStore::open(Arc::new(cfg)).expect("DocumentStore::open should succeed")
    }

    fn western(name: &str) -> Medication {
        Medication::new(text(name), text("5mg"), MedicationType::Western, None)
    }

    fn count_files(dir: &Path) -> usize {
        let mut count = 0;
        for entry in fs::read_dir(dir).unwrap().flatten() {
            let path = entry.path();
            if path.is_dir() {
                count += count_files(&path);
            } else {
                count += 1;
            }
        }
        count
    }

    #[test]
    fn open_creates_collection_dirs() {
        let temp = TempDir::new().unwrap();
        let _store = test_store(&temp);

        assert!(temp.path().join("patients").is_dir());
        assert!(temp.path().join("medications").join("names").is_dir());
        assert!(temp.path().join("plans").is_dir());
    }

    #[test]
    fn keyed_path_is_sharded_digest() {
        let digest = key_digest("p1");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        let path = keyed_path(Path::new("patients"), "p1", ".json");
        assert_eq!(
            path,
            Path::new("patients")
                .join(&digest[0..2])
                .join(&digest[2..4])
                .join(format!("{}.json", digest))
        );
        assert_ne!(key_digest("p1"), key_digest("P1"));
    }

    #[test]
    fn patient_insert_then_find() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        assert!(store.find_patient(&text("p1")).unwrap().is_none());

        let patient = Patient::new(text("p1"), "New Patient p1".into());
        let stored = store.insert_patient_or_get(patient.clone()).unwrap();
        assert_eq!(stored, patient);

        let found = store.find_patient(&text("p1")).unwrap().unwrap();
        assert_eq!(found.name, "New Patient p1");
    }

    #[test]
    fn patient_insert_keeps_first_writer() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        let first = Patient::new(text("p1"), "First".into());
        let second = Patient::new(text("p1"), "Second".into());

        store.insert_patient_or_get(first).unwrap();
        let stored = store.insert_patient_or_get(second).unwrap();

        assert_eq!(stored.name, "First");
        assert_eq!(count_files(&temp.path().join("patients")), 1);
    }

    #[test]
    fn patient_ids_with_path_characters_stay_inside_collection() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        let patient = Patient::new(text("../../etc/passwd"), "Odd".into());
        store.insert_patient_or_get(patient).unwrap();

        let found = store.find_patient(&text("../../etc/passwd")).unwrap();
        assert_eq!(found.unwrap().name, "Odd");
        assert_eq!(count_files(&temp.path().join("patients")), 1);
    }

    #[test]
    fn long_keys_are_stored_and_found() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);
        let long_id = "x".repeat(200);
        let long_name = "加味逍遥散".repeat(14);
        assert!(long_name.len() > 200);

        let patient = Patient::new(text(&long_id), "Long".into());
        store.insert_patient_or_get(patient).unwrap();
        assert_eq!(store.find_patient(&text(&long_id)).unwrap().unwrap().name, "Long");

        let med = store.insert_medication_or_get(western(&long_name)).unwrap();
        let found = store.find_medication_by_name(&text(&long_name)).unwrap();
        assert_eq!(found.map(|m| m.id), Some(med.id));
    }

    #[test]
    fn patient_under_another_keys_digest_is_a_collision() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        let stranger = Patient::new(text("p2"), "Stranger".into());
        write_document(&store.patient_path(&text("p1")), &stranger).unwrap();

        let err = store.find_patient(&text("p1")).unwrap_err();
        assert!(matches!(err, CdssError::KeyCollision { collection: "patients", .. }));
    }

    #[test]
    fn name_claim_for_another_medication_is_a_collision() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        let other = store.insert_medication_or_get(western("Heparin")).unwrap();
        let claim = store.medication_name_path(&text("Warfarin"));
        fs::create_dir_all(claim.parent().unwrap()).unwrap();
        fs::write(&claim, other.id.to_string()).unwrap();

        let err = store.find_medication_by_name(&text("Warfarin")).unwrap_err();
        assert!(matches!(err, CdssError::KeyCollision { collection: "medications", .. }));
    }

    #[test]
    fn temp_sibling_without_parent_is_a_storage_error() {
        let err = temp_sibling(Path::new("/")).unwrap_err();
        assert!(matches!(err, CdssError::InvalidStoragePath { .. }));
        assert!(!err.is_validation());
    }

    #[test]
    fn medication_lookup_by_name_is_exact() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        let med = store.insert_medication_or_get(western("Warfarin")).unwrap();

        let by_name = store.find_medication_by_name(&text("Warfarin")).unwrap();
        assert_eq!(by_name.as_ref().map(|m| m.id), Some(med.id));
        assert!(store.find_medication_by_name(&text("warfarin")).unwrap().is_none());
        assert_eq!(store.find_medication(&med.id).unwrap(), Some(med));
    }

    #[test]
    fn medication_name_claim_returns_existing_and_cleans_up() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        let first = store.insert_medication_or_get(western("Aspirin")).unwrap();
        let loser = western("Aspirin");
        let loser_id = loser.id;
        let stored = store.insert_medication_or_get(loser).unwrap();

        assert_eq!(stored.id, first.id);
        assert!(store.find_medication(&loser_id).unwrap().is_none());
    }

    #[test]
    fn dangling_name_index_is_reported() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        let med = store.insert_medication_or_get(western("Heparin")).unwrap();
        fs::remove_file(med.id.sharded_file(&temp.path().join("medications"))).unwrap();

        let err = store.find_medication_by_name(&text("Heparin")).unwrap_err();
        assert!(matches!(err, CdssError::DanglingIndex { collection: "medications", .. }));
    }

    #[test]
    fn find_plans_filters_and_orders() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);
        let med = DocumentId::new();

        let first = MedicationPlan::new(text("p1"), med, text("daily"));
        let mut inactive = MedicationPlan::new(text("p1"), med, text("weekly"));
        inactive.is_active = false;
        let other = MedicationPlan::new(text("p2"), med, text("nightly"));

        for plan in [&first, &inactive, &other] {
            store.insert_plan(plan).unwrap();
        }

        let all = store.find_plans(PlanFilter::default()).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].created_at <= w[1].created_at));

        let active_p1 = store.find_plans(PlanFilter::active_for(&text("p1"))).unwrap();
        assert_eq!(active_p1, vec![first.clone()]);

        assert_eq!(store.find_plan(&other.id).unwrap(), Some(other));
    }

    #[test]
    fn find_plans_skips_temporary_files() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        let plan = MedicationPlan::new(text("p1"), DocumentId::new(), text("daily"));
        store.insert_plan(&plan).unwrap();

        let shard = plan.id.shard_dir(&temp.path().join("plans"));
        fs::write(shard.join(".abandoned.tmp"), b"{").unwrap();
        fs::write(shard.join("notes.txt"), b"not a plan").unwrap();

        assert_eq!(store.find_plans(PlanFilter::default()).unwrap().len(), 1);
    }

    #[test]
    fn corrupt_plan_document_is_an_error() {
        let temp = TempDir::new().unwrap();
        let store = test_store(&temp);

        let plan = MedicationPlan::new(text("p1"), DocumentId::new(), text("daily"));
        store.insert_plan(&plan).unwrap();
        fs::write(plan.id.sharded_file(&temp.path().join("plans")), b"{ not json").unwrap();

        let err = store.find_plans(PlanFilter::default()).unwrap_err();
        assert!(matches!(err, CdssError::Deserialization { .. }));
    }
}

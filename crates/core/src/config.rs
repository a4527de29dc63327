//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the store and the
//! services. Request handling never reads environment variables.

use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_PORT, MEDICATIONS_DIR_NAME, MEDICATION_NAMES_DIR_NAME,
    PATIENTS_DIR_NAME, PLANS_DIR_NAME,
};
use crate::{CdssError, CdssResult};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`CdssError::DataDirMissing`] if `data_dir` is not an existing directory. The
    /// store is the system's only persistence, so a missing directory is treated like an
    /// unreachable database.
    pub fn new(data_dir: PathBuf) -> CdssResult<Self> {
        if !data_dir.is_dir() {
            return Err(CdssError::DataDirMissing { path: data_dir });
        }
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn patients_dir(&self) -> PathBuf {
        self.data_dir.join(PATIENTS_DIR_NAME)
    }

    pub fn medications_dir(&self) -> PathBuf {
        self.data_dir.join(MEDICATIONS_DIR_NAME)
    }

    pub fn medication_names_dir(&self) -> PathBuf {
        self.medications_dir().join(MEDICATION_NAMES_DIR_NAME)
    }

    pub fn plans_dir(&self) -> PathBuf {
        self.data_dir.join(PLANS_DIR_NAME)
    }
}

/// Resolve the data directory from an optional `CDSS_DATA_DIR` value.
///
/// If `value` is `None` or blank, returns [`DEFAULT_DATA_DIR`].
pub fn data_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from)
}

/// Resolve the REST bind address from an optional `PORT` value.
///
/// The server always binds all IPv4 interfaces; only the port is configurable.
///
/// # Errors
///
/// Returns [`CdssError::InvalidInput`] if the value is not a valid port number.
pub fn rest_addr_from_env_value(value: Option<String>) -> CdssResult<SocketAddr> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let port = match value {
        Some(v) => v
            .parse::<u16>()
            .map_err(|e| CdssError::InvalidInput(format!("PORT '{}' is not valid: {}", v, e)))?,
        None => DEFAULT_PORT,
    };

    Ok(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
}

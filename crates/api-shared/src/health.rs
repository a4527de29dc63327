use crate::wire::HealthRes;

/// Health check shared by the server binaries.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Returns a `HealthRes` indicating the service is up.
    ///
    /// There are no downstream checks: the document store is verified once at startup.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "CDSS is alive".into(),
        }
    }
}

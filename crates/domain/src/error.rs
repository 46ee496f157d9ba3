use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Tag list unavailable for device '{device_id}': {reason}")]
    CatalogueUnavailable { device_id: String, reason: String },

    #[error("Device '{device_id}' unavailable: {reason}")]
    DeviceUnavailable { device_id: String, reason: String },

    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Batch not found: {0}")]
    BatchNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Cache storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn catalogue_unavailable(device_id: &str, reason: impl ToString) -> Self {
        Self::CatalogueUnavailable {
            device_id: device_id.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn device_unavailable(device_id: &str, reason: impl ToString) -> Self {
        Self::DeviceUnavailable {
            device_id: device_id.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for lookups that failed because the ID is not configured
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DeviceNotFound(_) | Self::BatchNotFound(_))
    }

    /// True for failures a caller may retry later
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::CatalogueUnavailable { .. } | Self::DeviceUnavailable { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;

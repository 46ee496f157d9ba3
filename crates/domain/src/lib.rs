//! Domain layer - PLC tag gateway model with no I/O
//!
//! This crate contains:
//! - Device and batch configuration (DeviceConfig, BatchConfig)
//! - The tag filter and the device registry
//! - Tag catalogue and tag value types
//! - Collaborator interfaces (DeviceGateway, CatalogueStore)
//!
//! Principles:
//! - No dependencies on infrastructure
//! - Configuration rules enforced when the registry is built
//! - Testable in isolation

pub mod device;
pub mod driver;
pub mod error;
pub mod tag;

// Re-export commonly used types
pub use device::{
    BatchConfig, Device, DeviceConfig, DeviceRegistry, FilteredTags, PlcAddress, TagFilter,
};
pub use driver::DeviceGateway;
pub use error::DomainError;
pub use tag::{
    CatalogueStore, PlcValue, TagCatalogue, TagCatalogueEntry, TagReadBatch, TagTypeMap,
    TagValueResult,
};

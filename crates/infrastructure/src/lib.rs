//! Infrastructure layer - External integrations

pub mod cache;
pub mod config;
pub mod drivers;

pub use cache::FileCatalogueStore;
pub use config::{DeviceConfigFile, ServerSettings, SimulatorSettings};
pub use drivers::{GatewayFactory, SimulatorGateway};

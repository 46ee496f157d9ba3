mod simulator_gateway;

pub use simulator_gateway::{SimulatorGateway, UNKNOWN_TAG_STATUS};

use std::sync::Arc;

use domain::DeviceGateway;

use crate::config::ServerSettings;

/// Factory for the device gateway used by the server
pub struct GatewayFactory;

impl GatewayFactory {
    /// Build the gateway described by `settings`. The simulator is the only
    /// protocol shipped; a real driver would be selected here.
    pub fn create_gateway(settings: &ServerSettings) -> Arc<dyn DeviceGateway> {
        Arc::new(SimulatorGateway::new(&settings.simulator))
    }
}

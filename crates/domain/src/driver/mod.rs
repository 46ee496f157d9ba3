mod device_gateway;

pub use device_gateway::DeviceGateway;

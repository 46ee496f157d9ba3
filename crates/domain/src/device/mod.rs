mod config;
mod filter;
mod registry;

pub use config::{BatchConfig, DeviceConfig, PlcAddress};
pub use filter::{FilteredTags, TagFilter, filter_tags};
pub use registry::{Device, DeviceRegistry};

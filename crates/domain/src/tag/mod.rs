mod catalogue;
mod catalogue_store;
mod value;

pub use catalogue::{TagCatalogue, TagCatalogueEntry, TagTypeMap, is_within_ttl};
pub use catalogue_store::CatalogueStore;
pub use value::{PlcValue, TagReadBatch, TagValueResult};

mod value_service;

pub use value_service::TagValueService;

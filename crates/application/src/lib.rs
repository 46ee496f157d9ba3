//! Application layer - Use cases and business workflows

pub mod catalogue;
pub mod clock;
pub mod tag;

pub use catalogue::TagListCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use tag::TagValueService;

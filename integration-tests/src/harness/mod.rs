pub mod fixtures;
pub mod tracing;

pub use fixtures::{ApacheSite, access_line, clf_time};
pub use tracing::{CapturedEvent, init_test_tracing};

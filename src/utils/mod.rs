pub mod logging;
pub mod timing;

pub use timing::{cancellable_sleep, poll_until, Wait};

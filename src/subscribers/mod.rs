//! # Pool event observers.
//!
//! - [`Subscribe`] - observer trait with per-subscriber queue sizing
//! - [`SubscriberSet`] - non-blocking fan-out with panic isolation
//! - `LogWriter` - stdout writer behind the `logging` feature

mod set;
mod subscriber;

pub use set::SubscriberSet;
pub use subscriber::Subscribe;

#[cfg(feature = "logging")]
mod log;
#[cfg(feature = "logging")]
pub use log::LogWriter;

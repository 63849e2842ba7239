pub mod config;
pub mod humanize;
pub mod observability;
pub mod race;
pub mod transport;

pub use race::{CancelHandle, FetchError, FetchStatus, FetchSuccess, RaceFetcher, StatusSink};

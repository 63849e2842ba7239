//! Multi-path fetch race
//!
//! A [`RaceFetcher`] fetches one target through every [`DeliveryPath`] at
//! once and returns the body of the first path to succeed.
//!
//! ## Key Components
//!
//! - [`PathSet`] / [`DeliveryPath`] - ordered transforms from target to concrete address
//! - [`RaceFetcher`] - runs the race against a global deadline
//! - [`CancelHandle`] - caller-owned cancellation, bridged into every attempt
//! - [`StatusSink`] - advisory `connecting` / `downloading` / `parsing` reports
//!
//! Each attempt gets its own `CancellationToken`. When a winner is chosen,
//! the deadline passes, or the caller cancels, every other attempt's token is
//! cancelled and its future dropped.
//!
//! ## Example
//!
//! ```rust,ignore
//! use feedrace::config::Config;
//! use feedrace::race::{CancelHandle, FetchStatus, RaceFetcher};
//!
//! let fetcher = RaceFetcher::from_config(&Config::load()?)?;
//! let cancel = CancelHandle::new();
//! let log_status = |s: FetchStatus| eprintln!("{s}");
//!
//! let body = fetcher
//!     .fetch("https://example.com/feed.xml", Some(&cancel), Some(&log_status))
//!     .await?;
//! ```

mod attempt;
mod cancel;
mod error;
mod fetcher;
pub mod paths;
mod status;

pub use cancel::{CancelHandle, ListenerGuard, ListenerId};
pub use error::{BuildError, FetchError};
pub use fetcher::{FetchSuccess, RaceFetcher};
pub use paths::{DeliveryPath, PathError, PathSet, ResolvedAddress};
pub use status::{FetchStatus, StatusSink};

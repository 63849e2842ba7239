use serde::Serialize;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Coarse lifecycle label reported while fetching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Connecting,
    Downloading,
    Parsing,
}

impl FetchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStatus::Connecting => "connecting",
            FetchStatus::Downloading => "downloading",
            FetchStatus::Parsing => "parsing",
        }
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory progress sink. Implementations must return quickly.
pub trait StatusSink: Send + Sync {
    fn on_status(&self, status: FetchStatus);
}

impl<F> StatusSink for F
where
    F: Fn(FetchStatus) + Send + Sync,
{
    fn on_status(&self, status: FetchStatus) {
        self(status)
    }
}

/// Deliver `status` to an optional sink; a panicking sink is logged and ignored
pub(crate) fn report(sink: Option<&dyn StatusSink>, status: FetchStatus) {
    let Some(sink) = sink else {
        return;
    };

    if catch_unwind(AssertUnwindSafe(|| sink.on_status(status))).is_err() {
        tracing::warn!(%status, "Status sink panicked, ignoring");
    }
}

//! Race coordinator

use super::attempt::{AttemptOutcome, PathAttempt};
use super::cancel::CancelHandle;
use super::error::{BuildError, FetchError};
use super::paths::PathSet;
use super::status::{self, FetchStatus, StatusSink};
use crate::config::Config;
use crate::observability::Metrics;
use crate::transport::{HttpConfig, HttpTransport, Transport, TransportError};
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

/// Successful fetch: the winning body and which path delivered it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSuccess {
    pub body: String,
    pub won_by_index: usize,
    pub path_name: String,
}

/// Terminal value of one race
enum RaceOutcome<R> {
    Won { index: usize, response: R },
    Failed(FetchError),
    Cancelled,
}

/// Fetches a resource by racing every configured delivery path
pub struct RaceFetcher<T = HttpTransport> {
    transport: T,
    paths: PathSet,
    deadline: Duration,
    metrics: Arc<Metrics>,
}

impl RaceFetcher<HttpTransport> {
    /// Build an HTTP-backed fetcher from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, BuildError> {
        let paths = PathSet::from_config(&config.paths)?;
        let transport = HttpTransport::new(HttpConfig::from(&config.race))?;
        Self::new(transport, paths, config.race.deadline.as_duration())
    }
}

impl<T: Transport> RaceFetcher<T> {
    pub fn new(transport: T, paths: PathSet, deadline: Duration) -> Result<Self, BuildError> {
        if deadline.is_zero() {
            return Err(BuildError::ZeroDeadline);
        }

        Ok(Self {
            transport,
            paths,
            deadline,
            metrics: Arc::new(Metrics::new()),
        })
    }

    /// Share a metrics handle with other components
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn paths(&self) -> &PathSet {
        &self.paths
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch `target`, returning the raw body of the first path to succeed
    pub async fn fetch(
        &self,
        target: &str,
        external_cancel: Option<&CancelHandle>,
        on_status: Option<&dyn StatusSink>,
    ) -> Result<String, FetchError> {
        self.fetch_detailed(target, external_cancel, on_status)
            .await
            .map(|success| success.body)
    }

    /// Like [`RaceFetcher::fetch`], also reporting which path won
    pub async fn fetch_detailed(
        &self,
        target: &str,
        external_cancel: Option<&CancelHandle>,
        on_status: Option<&dyn StatusSink>,
    ) -> Result<FetchSuccess, FetchError> {
        if target.is_empty() {
            return Err(FetchError::InvalidTarget);
        }

        if external_cancel.is_some_and(CancelHandle::is_cancelled) {
            debug!(url = target, "Cancelled before start");
            self.metrics.race_cancelled();
            return Err(FetchError::Cancelled);
        }

        let span = info_span!("race", race_id = %Uuid::now_v7(), paths = self.paths.len());
        self.race(target, external_cancel, on_status)
            .instrument(span)
            .await
    }

    async fn race(
        &self,
        target: &str,
        external_cancel: Option<&CancelHandle>,
        on_status: Option<&dyn StatusSink>,
    ) -> Result<FetchSuccess, FetchError> {
        self.metrics.race_started();
        status::report(on_status, FetchStatus::Connecting);

        // Parent of every attempt token; only the external bridge cancels it
        let race_token = CancellationToken::new();

        let mut attempts: Vec<PathAttempt<'_>> = self
            .paths
            .iter()
            .enumerate()
            .map(|(index, path)| PathAttempt::new(index, path, target, race_token.child_token()))
            .collect();

        let subscription = external_cancel.map(|handle| {
            let token = race_token.clone();
            handle.subscribe(move || token.cancel())
        });

        let mut in_flight: FuturesUnordered<_> = attempts
            .iter()
            .map(|attempt| {
                debug!(
                    index = attempt.index,
                    path = attempt.path.name(),
                    address = %attempt.address,
                    "Attempt started"
                );
                self.launch(attempt.index, attempt.address.clone(), attempt.token.clone())
            })
            .collect();

        let deadline = tokio::time::sleep(self.deadline);
        tokio::pin!(deadline);

        let outcome = loop {
            tokio::select! {
                biased;

                next = in_flight.next() => match next {
                    Some((index, Ok(response))) => {
                        attempts[index].settle(AttemptOutcome::Succeeded);
                        break RaceOutcome::Won { index, response };
                    }
                    Some((index, Err(reason))) => {
                        let attempt = &mut attempts[index];
                        debug!(index, path = attempt.path.name(), %reason, "Attempt failed");
                        let outcome = match reason {
                            TransportError::Cancelled => AttemptOutcome::Cancelled,
                            other => {
                                self.metrics.attempt_failed();
                                AttemptOutcome::Failed(other)
                            }
                        };
                        attempt.settle(outcome);
                    }
                    None if race_token.is_cancelled() => break RaceOutcome::Cancelled,
                    None => {
                        break RaceOutcome::Failed(FetchError::AllPathsFailed {
                            attempts: attempts.len(),
                        });
                    }
                },

                _ = race_token.cancelled() => break RaceOutcome::Cancelled,

                _ = &mut deadline => {
                    break RaceOutcome::Failed(FetchError::Timeout { after: self.deadline });
                }
            }
        };

        // Outcome is fixed: stop listening before anything else can observe a late cancel
        drop(subscription);

        let winner = match &outcome {
            RaceOutcome::Won { index, .. } => Some(*index),
            _ => None,
        };
        self.cancel_losers(&mut attempts, winner);

        // Discard whatever the losers settle with
        drop(in_flight);

        match outcome {
            RaceOutcome::Won { index, response } => {
                self.finish_winner(&attempts[index], response, attempts.len(), on_status)
                    .await
            }
            RaceOutcome::Failed(error) => {
                self.log_failure(&attempts, &error);
                Err(error)
            }
            RaceOutcome::Cancelled => {
                info!("Race cancelled by caller");
                self.metrics.race_cancelled();
                Err(FetchError::Cancelled)
            }
        }
    }

    /// One attempt's future: the transport call bound to the attempt's own token
    fn launch(
        &self,
        index: usize,
        address: String,
        token: CancellationToken,
    ) -> impl Future<Output = (usize, Result<T::Response, TransportError>)> + '_ {
        async move {
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => Err(TransportError::Cancelled),
                result = self.transport.send(&address, token.clone()) => result,
            };
            (index, result)
        }
    }

    /// Signal every non-winning token; runs once per race
    fn cancel_losers(&self, attempts: &mut [PathAttempt<'_>], winner: Option<usize>) {
        let mut cancelled = 0;
        for attempt in attempts.iter_mut().filter(|a| Some(a.index) != winner) {
            if attempt.cancel() {
                cancelled += 1;
            }
        }

        if cancelled > 0 {
            debug!(cancelled, "Cancelled pending attempts");
        }
        self.metrics.losers_cancelled(cancelled);
    }

    async fn finish_winner(
        &self,
        attempt: &PathAttempt<'_>,
        response: T::Response,
        attempts: usize,
        on_status: Option<&dyn StatusSink>,
    ) -> Result<FetchSuccess, FetchError> {
        let path_name = attempt.path.name();
        info!(index = attempt.index, path = path_name, "Path won the race");

        status::report(on_status, FetchStatus::Downloading);

        let body = match self.transport.read_body(response).await {
            Ok(body) => body,
            Err(reason) => {
                // Losers are already cancelled; nothing is left to fall back on
                warn!(
                    index = attempt.index,
                    path = path_name,
                    %reason,
                    "Winning path failed to deliver body"
                );
                self.metrics.race_failed();
                return Err(FetchError::AllPathsFailed { attempts });
            }
        };

        status::report(on_status, FetchStatus::Parsing);
        self.metrics.race_won();

        Ok(FetchSuccess {
            body,
            won_by_index: attempt.index,
            path_name: path_name.to_string(),
        })
    }

    fn log_failure(&self, attempts: &[PathAttempt<'_>], error: &FetchError) {
        let reasons: Vec<String> = attempts
            .iter()
            .filter_map(|a| match a.outcome() {
                AttemptOutcome::Failed(reason) => Some(format!("{}: {}", a.path.name(), reason)),
                _ => None,
            })
            .collect();

        match error {
            FetchError::Timeout { after } => {
                warn!(after_ms = after.as_millis() as u64, failed = ?reasons, "Race timed out");
                self.metrics.race_timed_out();
            }
            _ => {
                warn!(failed = ?reasons, "All delivery paths failed");
                self.metrics.race_failed();
            }
        }
    }
}

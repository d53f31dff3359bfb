use crate::backend::{Backend, BackendError, SendReport, SentSet};
use crate::poller::{PollError, Poller};
use std::time::Duration;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("poll failed: {0}")]
    Poll(#[from] PollError),

    #[error("backend send failed: {0}")]
    Backend(#[from] BackendError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Polling,
    Sending,
    Stopped,
}

/// Drives the poll/send loop for one cluster.
///
/// Owns the sent set for the lifetime of the process. Cycles never overlap:
/// a slow cycle delays the next tick instead of running alongside it.
pub struct Controller {
    poller: Poller,
    backend: Box<dyn Backend>,
    sent: SentSet,
    interval: Duration,
    state: LoopState,
}

impl Controller {
    pub fn new(poller: Poller, backend: Box<dyn Backend>, interval: Duration) -> Self {
        Self {
            poller,
            backend,
            sent: SentSet::new(),
            interval,
            state: LoopState::Idle,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn sent(&self) -> &SentSet {
        &self.sent
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    /// Runs cycles until one fails. The first cycle starts immediately.
    pub async fn run(&mut self) -> Result<(), ControllerError> {
        info!(
            cluster = %self.poller.cluster_id(),
            backend = self.backend.name(),
            interval_secs = self.interval.as_secs(),
            "Starting service log forwarder"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            if let Err(e) = self.run_cycle().await {
                self.state = LoopState::Stopped;
                error!(cluster = %self.poller.cluster_id(), error = %e, "Stopping forwarder");
                return Err(e);
            }
        }
    }

    /// One poll followed by one send.
    pub async fn run_cycle(&mut self) -> Result<SendReport, ControllerError> {
        let span = info_span!(
            "poll_cycle",
            cluster = %self.poller.cluster_id(),
            cycle_id = %Uuid::new_v4()
        );

        async {
            self.state = LoopState::Polling;
            let response = self.poller.poll().await?;

            self.state = LoopState::Sending;
            let report = self.backend.send(&response, &mut self.sent).await?;

            debug!(
                sent_total = self.sent.len(),
                outstanding = report.outstanding(),
                "Cycle complete"
            );
            self.state = LoopState::Idle;

            Ok::<_, ControllerError>(report)
        }
        .instrument(span)
        .await
    }
}

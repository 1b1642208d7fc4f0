//! Poll loop and scheduling.
//!
//! A single logical thread of control: the scheduler runs one poll to
//! completion, sleeps for the configured period, and polls again. The period
//! is measured from poll completion, so a slow poll shifts the schedule
//! rather than overlapping it. Cancellation is cooperative and observed both
//! between polls and between individual dispatches.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::Result;
use crate::builder;
use crate::detector::ChangeDetector;
use crate::dispatch::{self, DeliveryOutcome};
use crate::payload::PayloadDecoder;
use crate::providers::PushProvider;
use crate::resolver::DisplayNameResolver;
use crate::store::NotificationStore;

/// Owns the store handle, the cursor, and the per-record pipeline.
///
/// There is exactly one poller per process; nothing else touches the store.
pub struct Poller {
    store: NotificationStore,
    detector: ChangeDetector,
    decoder: Box<dyn PayloadDecoder>,
    resolver: Box<dyn DisplayNameResolver>,
}

impl Poller {
    pub fn new(
        store: NotificationStore,
        decoder: Box<dyn PayloadDecoder>,
        resolver: Box<dyn DisplayNameResolver>,
    ) -> Self {
        Self {
            store,
            detector: ChangeDetector::new(),
            decoder,
            resolver,
        }
    }

    /// Capture the startup baseline so records already in the store are
    /// never forwarded. Must run before the first poll.
    pub async fn capture_baseline(&mut self) -> Result<()> {
        self.detector.capture_baseline(&self.store).await
    }

    /// Run one poll: detect new records, then decode, build, and dispatch
    /// each in chronological order. Returns the number of delivered sends.
    ///
    /// The cursor commits only after every record of the poll has been
    /// processed; a cancellation mid-poll leaves it untouched, so no record
    /// is ever skipped by a half-finished poll. Per-record failures (bad
    /// payload, rejected send) are logged and do not block the commit.
    pub async fn poll_once(
        &mut self,
        provider: &dyn PushProvider,
        cancel: &CancellationToken,
    ) -> Result<usize> {
        let outcome = self.detector.poll(&self.store).await?;
        let total = outcome.records.len();
        let mut delivered = 0;

        for record in &outcome.records {
            if cancel.is_cancelled() {
                debug!("Cancelled mid-poll; cursor not committed");
                return Ok(delivered);
            }

            let decoded = match self.decoder.decode(&record.data) {
                Ok(decoded) => decoded,
                Err(e) => {
                    warn!(rec_id = record.rec_id, "Skipping undecodable payload: {e}");
                    continue;
                }
            };

            let notification = builder::build(
                &decoded,
                record.effective_timestamp(),
                self.resolver.as_ref(),
            )
            .await;

            if let DeliveryOutcome::Delivered = dispatch::dispatch(&notification, provider).await {
                delivered += 1;
            }
        }

        if let Some(cursor) = outcome.prospective {
            self.detector.commit(cursor);
        }

        if total > 0 {
            debug!(total, delivered, "Poll complete");
        }

        Ok(delivered)
    }

    /// Close the store handle. Called once during shutdown.
    pub async fn close(&self) {
        self.store.close().await;
    }
}

/// Drives the poller on a fixed cadence until cancelled.
pub struct Scheduler {
    poller: Poller,
    provider: Box<dyn PushProvider>,
    period: Duration,
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new(
        poller: Poller,
        provider: Box<dyn PushProvider>,
        period: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            poller,
            provider,
            period,
            cancel,
        }
    }

    /// Run until cancelled: poll immediately, then every `period` measured
    /// from the end of the previous poll. On cancellation the store handle is
    /// closed and the loop exits cleanly.
    pub async fn run(mut self) -> Result<()> {
        info!(
            provider = self.provider.name(),
            period_secs = self.period.as_secs(),
            "Scheduler started"
        );

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            if let Err(e) = self
                .poller
                .poll_once(self.provider.as_ref(), &self.cancel)
                .await
            {
                // Store failures are fatal; the process cannot poll without
                // the store.
                self.poller.close().await;
                return Err(e);
            }

            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    break;
                }
                _ = tokio::time::sleep(self.period) => {}
            }
        }

        info!("Scheduler shutting down");
        self.poller.close().await;
        Ok(())
    }
}

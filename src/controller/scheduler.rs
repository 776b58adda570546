//! Retry and observation scheduler.
//!
//! ```text
//!                 immediate attempt
//!   Idle ──────────► Attempting ───────────► Succeeded
//!                      │   ▲
//!   retry timer ───────┤   │ failure: re-arm timer
//!   mutation batch ────┘   │
//!                          ├──── retries used up ──► Exhausted
//!                          │     (after hard timeout ► TimedOut)
//!                          └──── page unloaded ────► Cancelled
//! ```
//!
//! The mutation watcher, the retry timer, the hard timeout and the page-load
//! cancellation token are all event sources of one `select!` loop. Events
//! are handled one at a time by a single transition function, and attempts
//! never overlap.
//!
//! The hard timeout only bounds the watcher: it disconnects it, and the
//! retry timer keeps running until the tab is selected or the budget is
//! spent. A budget spent after the timeout ends in [`Phase::TimedOut`].
//! Reaching a terminal phase disconnects a still-attached watcher, clears
//! both deadlines and cancels the token, once.

// ============================================================================
// Imports
// ============================================================================

use std::future::{Future, pending};

use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::TabSelectorConfig;
use crate::identifiers::NodeId;
use crate::page::{MutationBatch, MutationFilter, MutationWatcher, Page};

use super::activation::{ActivationOutcome, attempt_activation};
use super::locator::TargetLocator;

// ============================================================================
// Phase
// ============================================================================

/// Lifecycle phase of one page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Not started.
    Idle,
    /// Attempting selection, possibly with a watcher attached.
    Attempting,
    /// Target tab is selected.
    Succeeded,
    /// Retry budget used up before the hard timeout.
    Exhausted,
    /// Retry budget used up after the hard timeout removed the watcher.
    TimedOut,
    /// The page load was abandoned by the caller.
    Cancelled,
}

impl Phase {
    /// Returns `true` for phases that end the page load's work.
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Exhausted | Self::TimedOut | Self::Cancelled
        )
    }
}

// ============================================================================
// ControllerState
// ============================================================================

/// Scheduler bookkeeping for one page load.
///
/// All fields move in one direction only: success is never revoked, counters
/// only grow, and a detached watcher is never reattached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerState {
    phase: Phase,
    has_succeeded: bool,
    retry_count: u32,
    attempts: u32,
    watcher_active: bool,
    watcher_timed_out: bool,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerState {
    /// Fresh state in [`Phase::Idle`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            has_succeeded: false,
            retry_count: 0,
            attempts: 0,
            watcher_active: false,
            watcher_timed_out: false,
        }
    }

    /// State of a page load abandoned before its first attempt.
    pub(crate) fn abandoned() -> Self {
        Self {
            phase: Phase::Cancelled,
            ..Self::new()
        }
    }

    /// Current phase.
    #[inline]
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns `true` once the target has been selected.
    #[inline]
    #[must_use]
    pub fn has_succeeded(&self) -> bool {
        self.has_succeeded
    }

    /// Retries started after the immediate attempt.
    #[inline]
    #[must_use]
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Activation attempts started, the immediate one included.
    #[inline]
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns `true` while a mutation watcher is attached.
    #[inline]
    #[must_use]
    pub fn watcher_active(&self) -> bool {
        self.watcher_active
    }

    /// Returns `true` if the hard timeout fired and removed the watcher.
    #[inline]
    #[must_use]
    pub fn watcher_timed_out(&self) -> bool {
        self.watcher_timed_out
    }

    fn start(&mut self) {
        if self.phase == Phase::Idle {
            self.phase = Phase::Attempting;
        }
    }

    /// Moves to a terminal phase. Returns `false` if already terminal.
    fn finish(&mut self, phase: Phase) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.phase = phase;
        if phase == Phase::Succeeded {
            self.has_succeeded = true;
        }
        true
    }
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug)]
enum SchedulerEvent {
    RetryDue,
    Mutations(MutationBatch),
    WatcherClosed,
    HardTimeout,
    Cancelled,
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

async fn next_batch_opt(watcher: Option<&mut MutationWatcher>) -> Option<MutationBatch> {
    match watcher {
        Some(watcher) => watcher.next_batch().await,
        None => pending().await,
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Drives one page load from the immediate attempt to a terminal phase.
pub(crate) struct Scheduler<'a> {
    page: &'a dyn Page,
    locator: &'a TargetLocator,
    config: &'a TabSelectorConfig,
    cancel: CancellationToken,
    state: ControllerState,
    watcher: Option<MutationWatcher>,
    retry_at: Option<Instant>,
    timeout_at: Option<Instant>,
    target_seen: bool,
}

impl<'a> Scheduler<'a> {
    pub(crate) fn new(
        page: &'a dyn Page,
        locator: &'a TargetLocator,
        config: &'a TabSelectorConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            page,
            locator,
            config,
            cancel,
            state: ControllerState::new(),
            watcher: None,
            retry_at: None,
            timeout_at: None,
            target_seen: false,
        }
    }

    /// Runs to a terminal phase and returns the final state.
    pub(crate) async fn run(mut self) -> ControllerState {
        self.state.start();

        match self.attempt().await {
            Some(outcome) if outcome.is_success() => {
                self.finish(Phase::Succeeded);
                return self.state;
            }
            Some(_) => {}
            None => return self.state,
        }

        self.target_seen = self.locate().await.is_some();
        self.attach_watcher();
        self.retry_at = Some(Instant::now() + self.config.retry_delay);

        while !self.state.phase().is_terminal() {
            let event = self.next_event().await;
            self.handle(event).await;
        }

        self.state
    }

    // ========================================================================
    // Event Loop
    // ========================================================================

    async fn next_event(&mut self) -> SchedulerEvent {
        let cancel = self.cancel.clone();
        let timeout_at = self.timeout_at;
        let retry_at = self.retry_at;
        let watcher = self.watcher.as_mut();

        tokio::select! {
            biased;
            () = cancel.cancelled() => SchedulerEvent::Cancelled,
            () = sleep_until_opt(timeout_at) => SchedulerEvent::HardTimeout,
            batch = next_batch_opt(watcher) => match batch {
                Some(batch) => SchedulerEvent::Mutations(batch),
                None => SchedulerEvent::WatcherClosed,
            },
            () = sleep_until_opt(retry_at) => SchedulerEvent::RetryDue,
        }
    }

    async fn handle(&mut self, event: SchedulerEvent) {
        if self.state.phase().is_terminal() {
            return;
        }

        match event {
            SchedulerEvent::Cancelled => self.finish(Phase::Cancelled),
            SchedulerEvent::HardTimeout => self.on_hard_timeout(),
            SchedulerEvent::RetryDue => {
                self.retry_at = None;
                self.retry().await;
            }
            SchedulerEvent::Mutations(batch) => self.on_mutations(batch).await,
            SchedulerEvent::WatcherClosed => {
                debug!("Observer closed by page, continuing with timed retries");
                self.watcher = None;
                self.state.watcher_active = false;
            }
        }
    }

    async fn on_mutations(&mut self, batch: MutationBatch) {
        if self.state.has_succeeded() {
            return;
        }

        let Some(node) = self.locate().await else {
            self.target_seen = false;
            return;
        };

        if self.locator.is_selected(self.page, node).await {
            info!(records = batch.len(), "Following tab selected");
            self.finish(Phase::Succeeded);
            return;
        }

        if !self.target_seen {
            self.target_seen = true;
            debug!(%node, "Following tab detected via observer");
            self.retry().await;
        }
    }

    // ========================================================================
    // Retry Path
    // ========================================================================

    async fn retry(&mut self) {
        if self.state.phase().is_terminal() {
            return;
        }

        if self.state.retry_count >= self.config.max_retries {
            if self.state.watcher_timed_out {
                self.finish(Phase::TimedOut);
            } else {
                self.finish(Phase::Exhausted);
            }
            return;
        }

        self.state.retry_count += 1;
        debug!(
            attempt = self.state.retry_count,
            max_retries = self.config.max_retries,
            "Retry attempt"
        );

        match self.attempt().await {
            Some(outcome) if outcome.is_success() => self.finish(Phase::Succeeded),
            Some(_) => self.retry_at = Some(Instant::now() + self.config.retry_delay),
            None => {}
        }
    }

    /// Runs one activation attempt, abandoning it if the page load is
    /// cancelled mid-attempt.
    async fn attempt(&mut self) -> Option<ActivationOutcome> {
        self.state.attempts += 1;
        let activation = attempt_activation(self.page, self.locator, self.config);

        match self.until_cancelled(activation).await {
            Some(outcome) => {
                debug!(attempt = self.state.attempts, %outcome, "Activation attempt finished");
                Some(outcome)
            }
            None => {
                self.finish(Phase::Cancelled);
                None
            }
        }
    }

    async fn until_cancelled<F: Future>(&self, work: F) -> Option<F::Output> {
        let cancel = self.cancel.clone();

        tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            output = work => Some(output),
        }
    }

    async fn locate(&self) -> Option<NodeId> {
        match self.locator.find_target_tab(self.page).await {
            Ok(node) => node,
            Err(e) => {
                debug!(error = %e, "Target lookup failed");
                None
            }
        }
    }

    // ========================================================================
    // Watcher & Teardown
    // ========================================================================

    fn attach_watcher(&mut self) {
        if let Some(previous) = self.watcher.take() {
            self.page.disconnect(previous.id());
        }

        debug!("Setting up DOM observer");
        match self.page.observe(&MutationFilter::selection_markers()) {
            Ok(watcher) => {
                self.watcher = Some(watcher);
                self.state.watcher_active = true;
            }
            Err(e) => warn!(error = %e, "Observer unavailable, relying on timed retries"),
        }
        self.timeout_at = Some(Instant::now() + self.config.observer_timeout);
    }

    fn detach_watcher(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            self.page.disconnect(watcher.id());
            self.state.watcher_active = false;
        }
    }

    /// Disconnects the watcher. Timed retries keep going.
    fn on_hard_timeout(&mut self) {
        self.timeout_at = None;
        self.state.watcher_timed_out = true;
        self.detach_watcher();
        warn!(
            timeout_ms = self.config.observer_timeout.as_millis() as u64,
            retry_count = self.state.retry_count,
            "Observer timeout reached"
        );
    }

    fn finish(&mut self, phase: Phase) {
        if !self.state.finish(phase) {
            return;
        }

        self.retry_at = None;
        self.timeout_at = None;
        self.detach_watcher();
        self.cancel.cancel();

        match phase {
            Phase::Succeeded => {
                info!(attempts = self.state.attempts, "Following tab selection complete");
            }
            Phase::Exhausted => warn!(
                max_retries = self.config.max_retries,
                "Max retries reached, giving up"
            ),
            Phase::TimedOut => warn!(
                max_retries = self.config.max_retries,
                "Max retries reached after observer timeout, giving up"
            ),
            Phase::Cancelled => debug!("Page load abandoned"),
            Phase::Idle | Phase::Attempting => {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Timed health regeneration for opponents.
//!
//! While an encounter with a regenerating opponent is live, a background
//! task restores a fixed amount of health on every tick. Health lives in a
//! [`SharedHealth`] so that the engine's damage and the task's healing are
//! applied under one lock, and a defeat observed under that lock halts the
//! task before it can heal again.
//!
//! Notifications are delivered over a channel and drained by the engine on
//! its own turn, so regen output never interleaves with an in-flight prompt.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Default time between two regeneration ticks.
pub const DEFAULT_REGEN_INTERVAL: Duration = Duration::from_millis(17_500);

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum RegenError {
    #[error("no async runtime is available to drive regeneration")]
    NoRuntime,
}

/// Lifecycle of a regeneration process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RegenState {
    Inactive,
    Active,
    Stopped,
}

/// One completed regeneration tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegenEvent {
    pub opponent: String,
    pub amount: i32,
    pub health: i32,
    pub max_health: i32,
}

#[derive(Debug)]
struct Pool {
    health: i32,
    max_health: i32,
    halted: bool,
    generation: u64,
}

/// Health shared between the engine and a regeneration task.
#[derive(Debug, Clone)]
pub struct SharedHealth(Arc<Mutex<Pool>>);

impl SharedHealth {
    pub fn new(max_health: i32) -> Self {
        Self(Arc::new(Mutex::new(Pool {
            health: max_health,
            max_health,
            halted: false,
            generation: 0,
        })))
    }

    fn lock(&self) -> MutexGuard<'_, Pool> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current(&self) -> i32 {
        self.lock().health
    }

    pub fn max(&self) -> i32 {
        self.lock().max_health
    }

    /// Apply damage, flooring at zero. Reaching zero halts regeneration.
    pub fn strike(&self, amount: i32) -> i32 {
        let mut pool = self.lock();
        pool.health = (pool.health - amount.max(0)).max(0);
        if pool.health == 0 {
            pool.halted = true;
        }
        pool.health
    }

    /// Force health to zero and halt regeneration.
    pub fn drain(&self) {
        let mut pool = self.lock();
        pool.health = 0;
        pool.halted = true;
    }

    /// Refuse further ticks until the next [`SharedHealth::begin_generation`].
    pub fn halt(&self) {
        self.lock().halted = true;
    }

    /// Open a new regeneration window and return its token.
    pub fn begin_generation(&self) -> u64 {
        let mut pool = self.lock();
        pool.generation += 1;
        pool.halted = false;
        pool.generation
    }

    /// Apply one tick if the window is still open and the owner is alive.
    ///
    /// Returns `(gained, health)` where `gained` is what the clamp let
    /// through, or `None` when the tick was discarded.
    pub fn regenerate(&self, generation: u64, amount: i32) -> Option<(i32, i32)> {
        let mut pool = self.lock();
        if pool.halted || pool.generation != generation || pool.health <= 0 {
            return None;
        }
        let before = pool.health;
        pool.health = (pool.health + amount.max(0)).min(pool.max_health);
        Some((pool.health - before, pool.health))
    }
}

/// A cancellable background process that heals a [`SharedHealth`].
#[derive(Debug)]
pub struct Regeneration {
    owner: String,
    amount: i32,
    interval: Duration,
    state: RegenState,
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    events_tx: mpsc::UnboundedSender<RegenEvent>,
    events_rx: mpsc::UnboundedReceiver<RegenEvent>,
}

impl Regeneration {
    pub fn new(owner: impl Into<String>, amount: i32, interval: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            owner: owner.into(),
            amount,
            interval,
            state: RegenState::Inactive,
            cancel: None,
            task: None,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> RegenState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == RegenState::Active
    }

    pub fn amount(&self) -> i32 {
        self.amount
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Spawn the regeneration task on the current tokio runtime.
    ///
    /// Starting an already active process does nothing, so at most one
    /// task ever heals a given opponent.
    pub fn start(&mut self, health: &SharedHealth) -> Result<(), RegenError> {
        if self.state == RegenState::Active {
            return Ok(());
        }
        let handle = Handle::try_current().map_err(|_| RegenError::NoRuntime)?;

        let generation = health.begin_generation();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let task = handle.spawn(run_ticks(
            self.owner.clone(),
            self.amount,
            self.interval,
            health.clone(),
            generation,
            cancel_rx,
            self.events_tx.clone(),
        ));

        self.cancel = Some(cancel_tx);
        self.task = Some(task);
        self.state = RegenState::Active;
        info!(
            target: "clash::regen",
            opponent = %self.owner,
            amount = self.amount,
            interval_ms = self.interval.as_millis() as u64,
            "regeneration started"
        );
        Ok(())
    }

    /// Stop the task. Safe to call repeatedly and on a never-started process.
    pub fn stop(&mut self, health: &SharedHealth) {
        health.halt();
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if self.state == RegenState::Active {
            self.state = RegenState::Stopped;
            info!(target: "clash::regen", opponent = %self.owner, "regeneration stopped");
        }
    }

    /// Take every notification produced since the last call.
    pub fn drain_events(&mut self) -> Vec<RegenEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Drop for Regeneration {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_ticks(
    owner: String,
    amount: i32,
    period: Duration,
    health: SharedHealth,
    generation: u64,
    mut cancel: oneshot::Receiver<()>,
    events: mpsc::UnboundedSender<RegenEvent>,
) {
    // A zero period would make the interval panic.
    let period = period.max(Duration::from_millis(1));
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut cancel => break,
            _ = ticker.tick() => {
                let Some((gained, current)) = health.regenerate(generation, amount) else {
                    debug!(target: "clash::regen", opponent = %owner, "tick discarded, regeneration halted");
                    break;
                };
                if gained == 0 {
                    continue;
                }
                debug!(target: "clash::regen", opponent = %owner, gained, health = current, "regenerated");
                let event = RegenEvent {
                    opponent: owner.clone(),
                    amount: gained,
                    health: current,
                    max_health: health.max(),
                };
                if events.send(event).is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strike_halts_at_zero() {
        let health = SharedHealth::new(50);
        let generation = health.begin_generation();
        assert_eq!(health.strike(20), 30);
        assert_eq!(health.regenerate(generation, 10), Some((10, 40)));
        assert_eq!(health.strike(100), 0);
        assert_eq!(health.regenerate(generation, 10), None);
        assert_eq!(health.current(), 0);
    }

    #[test]
    fn test_regenerate_clamps_and_checks_generation() {
        let health = SharedHealth::new(100);
        let old = health.begin_generation();
        health.strike(5);
        let new = health.begin_generation();
        assert_eq!(health.regenerate(old, 20), None);
        assert_eq!(health.regenerate(new, 20), Some((5, 100)));
        assert_eq!(health.regenerate(new, 20), Some((0, 100)));
    }

    #[test]
    fn test_start_without_runtime() {
        let health = SharedHealth::new(100);
        let mut regen = Regeneration::new("Lars", 20, DEFAULT_REGEN_INTERVAL);
        assert_eq!(regen.start(&health), Err(RegenError::NoRuntime));
        assert_eq!(regen.state(), RegenState::Inactive);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let health = SharedHealth::new(100);
        let mut regen = Regeneration::new("Lars", 20, DEFAULT_REGEN_INTERVAL);
        regen.stop(&health);
        assert_eq!(regen.state(), RegenState::Inactive);
        regen.stop(&health);
        assert!(regen.drain_events().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_heal_and_notify() {
        let health = SharedHealth::new(500);
        health.strike(100);
        let mut regen = Regeneration::new("Lars", 20, Duration::from_secs(1));
        regen.start(&health).unwrap();
        // A second start must not spawn another healer.
        regen.start(&health).unwrap();

        time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(health.current(), 440);

        let events = regen.drain_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].health, 440);
        assert_eq!(events[1].max_health, 500);

        regen.stop(&health);
        assert_eq!(regen.state(), RegenState::Stopped);
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(health.current(), 440);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_health_ticks_are_silent() {
        let health = SharedHealth::new(60);
        let mut regen = Regeneration::new("Lars", 20, Duration::from_secs(1));
        regen.start(&health).unwrap();

        time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(health.current(), 60);
        assert!(regen.drain_events().is_empty());

        // Topping up after a hit reports only what was restored.
        health.strike(5);
        time::sleep(Duration::from_secs(1)).await;
        let events = regen.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].amount, 5);
        assert_eq!(events[0].health, 60);
        regen.stop(&health);
    }

    #[tokio::test(start_paused = true)]
    async fn test_defeat_halts_pending_tick() {
        let health = SharedHealth::new(100);
        let mut regen = Regeneration::new("Lars", 20, Duration::from_secs(1));
        regen.start(&health).unwrap();
        health.strike(100);
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(health.current(), 0);
        assert!(regen.drain_events().is_empty());
        regen.stop(&health);
    }
}

//! A running game: shared simulation state plus its tick task.
//!
//! All state of one game sits behind a single mutex. The tick task and every
//! command entry point take that lock for the whole operation, publish the
//! events the operation produced while still holding it (so subscribers see
//! them in the order the changes happened), then release it.
//!
//! The tick task is a tokio task driven by `tokio::time::interval`. It stops
//! when told to through a oneshot channel or when the sending half is dropped
//! together with the [`Game`]. [`Game::stop`] awaits the task's `JoinHandle`,
//! so no update is running or pending once it returns.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::core::{GameEvent, GameSnapshot, GameState, TickOutcome};
use crate::event::{update_topic, Bus, Envelope};
use crate::types::Command;

struct Shared {
    topic: String,
    state: Mutex<GameState>,
    bus: Arc<Bus<GameEvent>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, GameState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `op` under the game lock and broadcast whatever it queued
    fn mutate<R>(&self, op: impl FnOnce(&mut GameState) -> R) -> R {
        let mut state = self.lock();
        let result = op(&mut state);
        for event in state.drain_events() {
            self.bus.publish(&self.topic, event.event_type(), event);
        }
        result
    }
}

struct Ticker {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Tick task state; `Stopping` covers the whole of [`Game::stop`]
enum Lifecycle {
    Idle,
    Running(Ticker),
    Stopping,
}

/// Finishes a stop even if the `stop` future is dropped mid-join
struct StopGuard<'a> {
    game: &'a Game,
}

impl Drop for StopGuard<'_> {
    fn drop(&mut self) {
        self.game.shared.bus.remove_channel(&self.game.shared.topic);
        *self.game.lifecycle() = Lifecycle::Idle;
    }
}

/// One game instance, identified by an opaque id
///
/// Every method takes `&self`, so a game can be shared (e.g. in an `Arc`)
/// between the task that owns its lifecycle and the tasks issuing commands.
pub struct Game {
    id: String,
    tick: Duration,
    shared: Arc<Shared>,
    lifecycle: Mutex<Lifecycle>,
}

impl Game {
    /// Create a game from config and register its `update/<id>` topic
    ///
    /// The config is used as given; call [`GameConfig::validate`] first when it
    /// comes from outside.
    pub fn new(bus: Arc<Bus<GameEvent>>, id: impl Into<String>, config: &GameConfig) -> Self {
        let state = GameState::new(config.width, config.height, config.fall_speed, config.seed);
        Self::with_state(bus, id, state, config.tick())
    }

    /// Create a game around a prepared simulation state
    pub fn with_state(
        bus: Arc<Bus<GameEvent>>,
        id: impl Into<String>,
        state: GameState,
        tick: Duration,
    ) -> Self {
        let id = id.into();
        let topic = update_topic(&id);
        bus.add_channel(&topic);

        Self {
            id,
            tick,
            shared: Arc::new(Shared {
                topic,
                state: Mutex::new(state),
                bus,
            }),
            lifecycle: Mutex::new(Lifecycle::Idle),
        }
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Topic this game publishes on
    pub fn topic(&self) -> &str {
        &self.shared.topic
    }

    /// Whether a tick task is running and no stop is in progress
    pub fn is_running(&self) -> bool {
        matches!(*self.lifecycle(), Lifecycle::Running(_))
    }

    pub fn is_over(&self) -> bool {
        self.shared.lock().is_over()
    }

    pub fn tick_count(&self) -> u64 {
        self.shared.lock().tick_count()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.shared.lock().snapshot()
    }

    /// Read the simulation state under the game lock
    pub fn inspect<R>(&self, f: impl FnOnce(&GameState) -> R) -> R {
        f(&self.shared.lock())
    }

    /// Listen to this game's events
    pub fn subscribe(&self) -> Option<broadcast::Receiver<Envelope<GameEvent>>> {
        self.shared.bus.subscribe(&self.shared.topic)
    }

    /// Begin ticking on the current tokio runtime; returns whether a tick
    /// task was spawned
    ///
    /// Starting a game that is running, or still stopping, is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(&self) -> bool {
        let mut lifecycle = self.lifecycle();
        match *lifecycle {
            Lifecycle::Running(_) => {
                warn!(game = %self.id, "start called on a running game");
                return false;
            }
            Lifecycle::Stopping => {
                warn!(game = %self.id, "start called while the game is stopping");
                return false;
            }
            Lifecycle::Idle => {}
        }

        self.shared.bus.add_channel(&self.shared.topic);

        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(run_ticker(Arc::clone(&self.shared), self.tick, stop_rx));
        *lifecycle = Lifecycle::Running(Ticker { stop_tx, handle });
        info!(game = %self.id, tick_ms = self.tick.as_millis() as u64, "game started");
        true
    }

    /// Stop ticking, wait for the tick task to exit, then deregister the topic
    ///
    /// Stopping a game that is not running is a no-op. The game counts as
    /// stopping until the topic is removed, and `start` refuses to run then.
    pub async fn stop(&self) {
        let ticker = {
            let mut lifecycle = self.lifecycle();
            match std::mem::replace(&mut *lifecycle, Lifecycle::Stopping) {
                Lifecycle::Running(ticker) => ticker,
                other => {
                    *lifecycle = other;
                    debug!(game = %self.id, "stop called on a game that is not running");
                    return;
                }
            }
        };
        let _guard = StopGuard { game: self };

        // The task may already be gone if it panicked; the join below reports it.
        let _ = ticker.stop_tx.send(());
        if let Err(e) = ticker.handle.await {
            warn!(game = %self.id, error = %e, "tick task ended abnormally");
        }
        info!(game = %self.id, "game stopped");
    }

    /// Advance the simulation by `delta_ms`; normally only the tick task calls this
    pub fn update(&self, delta_ms: u32) -> TickOutcome {
        self.shared.mutate(|state| state.update(delta_ms))
    }

    /// Apply a command token; returns whether it was understood
    pub fn command(&self, token: &str) -> bool {
        self.shared.mutate(|state| state.command(token))
    }

    /// Apply a command; returns whether the game state changed
    pub fn apply(&self, command: Command) -> bool {
        self.shared.mutate(|state| state.apply(command))
    }

    /// Move or rotate the falling piece if the target placement fits
    pub fn move_piece(&self, dr: i32, dx: i32, dy: i32) -> bool {
        self.shared.mutate(|state| {
            if state.is_over() {
                return false;
            }
            state.move_piece(dr, dx, dy)
        })
    }

    pub fn hold(&self) -> bool {
        self.apply(Command::Hold)
    }

    pub fn hard_lock(&self) -> bool {
        self.apply(Command::HardLock)
    }
}

async fn run_ticker(shared: Arc<Shared>, period: Duration, mut stop_rx: oneshot::Receiver<()>) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick of an interval completes immediately.
    interval.tick().await;
    let mut last = Instant::now();

    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            _ = interval.tick() => {
                // Whole milliseconds only; the remainder carries into the next tick.
                let elapsed = last.elapsed().as_millis();
                let delta = u32::try_from(elapsed).unwrap_or(u32::MAX);
                last += Duration::from_millis(u64::from(delta));
                shared.mutate(|state| state.update(delta));
            }
        }
    }

    debug!(topic = %shared.topic, "tick task exited");
}

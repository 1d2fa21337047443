//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{debug, info};

use super::{
    countdown::{CountdownConfig, CountdownController, Generation, TimerCommand, Transition},
    counter::{CounterStore, Mutation},
    snapshot::{CounterEvent, CounterSnapshot},
};
use crate::{store::KeyValueStore, tasks::countdown_ticker_task};

/// Counter, countdown and the live ticker, always mutated together
#[derive(Debug)]
struct Session {
    counter: CounterStore,
    countdown: CountdownController,
    ticker: Option<JoinHandle<()>>,
}

impl Session {
    fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot::capture(&self.counter, &self.countdown)
    }

    fn cancel_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

/// Shared application state.
///
/// Every intent and every timer tick goes through the single session lock, so
/// transitions happen one at a time in a well-defined order and events are
/// published in that same order.
#[derive(Debug)]
pub struct AppState {
    session: Mutex<Session>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
    /// Ordered stream of counter and countdown events
    event_tx: broadcast::Sender<CounterEvent>,
    /// Latest snapshot, refreshed before the session lock is released
    snapshot_tx: watch::Sender<CounterSnapshot>,
}

impl AppState {
    /// Load the counter from `store` and start with no countdown configured
    pub fn new(store: Arc<dyn KeyValueStore>, port: u16, host: String) -> Self {
        let counter = CounterStore::initialize(store);
        let countdown = CountdownController::new();
        let (event_tx, _) = broadcast::channel(100);
        let (snapshot_tx, _) = watch::channel(CounterSnapshot::capture(&counter, &countdown));

        info!("Counter loaded with value {}", counter.count());

        Self {
            session: Mutex::new(Session {
                counter,
                countdown,
                ticker: None,
            }),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            event_tx,
            snapshot_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CounterEvent> {
        self.event_tx.subscribe()
    }

    /// Latest published snapshot; never waits on the session lock
    pub fn snapshot(&self) -> CounterSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    pub fn increment(self: &Arc<Self>) -> CounterSnapshot {
        let mut session = self.lock_session();
        let count = session.counter.increment();
        info!("Count incremented to {}", count);
        self.publish(CounterEvent::Count(session.counter.count_update()));

        let transition = session.countdown.on_count_incremented();
        self.apply(&mut session, transition);
        self.finish(session, "increment")
    }

    /// Decrement unless the count is already zero
    pub fn decrement(self: &Arc<Self>) -> (Mutation, CounterSnapshot) {
        let mut session = self.lock_session();
        let mutation = session.counter.decrement();

        match mutation {
            Mutation::Ineligible(_) => (mutation, session.snapshot()),
            Mutation::Changed(count) => {
                info!("Count decremented to {}", count);
                self.publish(CounterEvent::Count(session.counter.count_update()));
                if count == 0 {
                    let transition = session.countdown.on_count_reset();
                    self.apply(&mut session, transition);
                }
                (mutation, self.finish(session, "decrement"))
            }
        }
    }

    pub fn reset(self: &Arc<Self>) -> CounterSnapshot {
        let mut session = self.lock_session();
        session.counter.reset();
        info!("Count reset");
        self.publish(CounterEvent::Count(session.counter.count_update()));

        let transition = session.countdown.on_count_reset();
        self.apply(&mut session, transition);
        self.finish(session, "reset")
    }

    /// Arm the countdown from raw prompt input; invalid input changes nothing
    pub fn set_countdown(self: &Arc<Self>, input: Option<&str>) -> Option<CountdownConfig> {
        let Some(config) = CountdownConfig::parse_input(input) else {
            debug!("Ignoring countdown input {:?}", input);
            return None;
        };

        let mut session = self.lock_session();
        session.countdown.set_config(config);
        self.finish(session, "countdown");
        Some(config)
    }

    /// Advance the countdown run `generation`.
    ///
    /// Returns whether that run is still live, i.e. whether the ticker should
    /// keep firing.
    pub fn countdown_tick(self: &Arc<Self>, generation: Generation) -> bool {
        let mut session = self.lock_session();
        let transition = session.countdown.on_tick(generation);
        if transition.events.is_empty() {
            return false;
        }

        self.apply(&mut session, transition);
        let live = session.countdown.generation() == generation && session.countdown.state().running;
        self.snapshot_tx.send_replace(session.snapshot());
        live
    }

    /// Stop any running countdown; called when the session ends
    pub fn teardown(self: &Arc<Self>) {
        let mut session = self.lock_session();
        let transition = session.countdown.teardown();
        self.apply(&mut session, transition);
        self.snapshot_tx.send_replace(session.snapshot());
        debug!("Countdown torn down");
    }

    /// Whether a ticker task currently exists and has not finished
    pub fn has_live_ticker(&self) -> bool {
        self.lock_session()
            .ticker
            .as_ref()
            .is_some_and(|ticker| !ticker.is_finished())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self
            .last_action
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            Some((action, at)) => (Some(action), Some(at)),
            None => (None, None),
        }
    }

    fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply(self: &Arc<Self>, session: &mut Session, transition: Transition) {
        for event in transition.events {
            self.publish(event.into());
        }

        match transition.timer {
            TimerCommand::Keep => {}
            TimerCommand::Cancel => session.cancel_ticker(),
            TimerCommand::Start(generation) => {
                session.cancel_ticker();
                let state = Arc::downgrade(self);
                session.ticker = Some(tokio::spawn(countdown_ticker_task(state, generation)));
            }
        }
    }

    fn finish(&self, session: MutexGuard<'_, Session>, action: &str) -> CounterSnapshot {
        let snapshot = session.snapshot();
        self.snapshot_tx.send_replace(snapshot.clone());
        drop(session);

        *self.last_action.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((action.to_string(), Utc::now()));
        snapshot
    }

    fn publish(&self, event: CounterEvent) {
        // No subscribers is the normal case when no view is attached
        if self.event_tx.send(event).is_err() {
            debug!("No subscribers for {:?}", event);
        }
    }
}

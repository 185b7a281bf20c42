use super::action::Action;
use super::debounce::Debouncer;
use crate::infrastructure::bridge::{Bridge, Subscription};
use std::time::Duration;
use tokio::sync::mpsc;

/// Resources owned by one open palette. Dropping the session deregisters
/// the bridge listener and cancels searches still waiting on their debounce,
/// so nothing from a closed palette reaches the state.
#[derive(Debug)]
pub struct PaletteSession {
    _subscription: Subscription,
    pub user_search: Debouncer,
    pub record_search: Debouncer,
}

impl PaletteSession {
    pub fn open(
        bridge: &Bridge,
        tx: mpsc::Sender<Action>,
        user_debounce: Duration,
        record_debounce: Duration,
    ) -> Self {
        let subscription = bridge.subscribe(move |message| {
            if tx.try_send(Action::BackgroundMessage(message)).is_err() {
                tracing::debug!("action queue unavailable; background reply dropped");
            }
        });
        Self {
            _subscription: subscription,
            user_search: Debouncer::new(user_debounce),
            record_search: Debouncer::new(record_debounce),
        }
    }

    pub fn cancel_searches(&mut self) {
        self.user_search.cancel();
        self.record_search.cancel();
    }
}

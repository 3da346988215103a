//! Change notification for session outputs.
//!
//! Each output is held in a [`tokio::sync::watch`] channel: subscribers see
//! the latest value and are woken on change, intermediate values may be
//! skipped.

use tokio::sync::watch;

use crate::market::MarketView;
use crate::session::SessionEvent;
use crate::simulator::{SimulatedState, SimulationError};
use crate::user::UserView;

/// Fans session events out to subscribers.
#[derive(Debug)]
pub struct Publisher {
    markets: watch::Sender<Vec<MarketView>>,
    user: watch::Sender<Option<UserView>>,
    simulation: watch::Sender<Option<SimulatedState>>,
    simulation_error: watch::Sender<Option<SimulationError>>,
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new()
    }
}

impl Publisher {
    /// Create a publisher with empty values.
    pub fn new() -> Self {
        Self {
            markets: watch::channel(Vec::new()).0,
            user: watch::channel(None).0,
            simulation: watch::channel(None).0,
            simulation_error: watch::channel(None).0,
        }
    }

    /// Publishes every event, in order.
    ///
    /// Values are stored even when nobody is subscribed.
    pub fn publish(&self, events: impl IntoIterator<Item = SessionEvent>) {
        for event in events {
            match event {
                SessionEvent::MarketsUpdated(markets) => {
                    self.markets.send_replace(markets);
                }
                SessionEvent::UserUpdated(user) => {
                    self.user.send_replace(Some(user));
                }
                SessionEvent::SimulationUpdated(state) => {
                    self.simulation.send_replace(state);
                }
                SessionEvent::SimulationErrorUpdated(error) => {
                    self.simulation_error.send_replace(error);
                }
            }
        }
    }

    /// Subscribe to market views.
    pub fn subscribe_markets(&self) -> watch::Receiver<Vec<MarketView>> {
        self.markets.subscribe()
    }

    /// Subscribe to the user view.
    pub fn subscribe_user(&self) -> watch::Receiver<Option<UserView>> {
        self.user.subscribe()
    }

    /// Subscribe to the final simulated state.
    pub fn subscribe_simulation(&self) -> watch::Receiver<Option<SimulatedState>> {
        self.simulation.subscribe()
    }

    /// Subscribe to the first simulation error.
    pub fn subscribe_simulation_error(&self) -> watch::Receiver<Option<SimulationError>> {
        self.simulation_error.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Operation;
    use crate::session::{Session, SessionConfig};
    use crate::simulator::SimulationErrorKind;
    use crate::state::{GlobalContext, MarketConfig, ScaledMarketState, Snapshot};
    use alloy_primitives::{Address, U256};
    use std::time::Instant;

    fn market() -> Address {
        Address::repeat_byte(0xaa)
    }

    fn create_test_snapshot() -> Snapshot {
        Snapshot::default()
            .with_market(
                ScaledMarketState::new(market(), 0),
                MarketConfig {
                    underlying: market(),
                    symbol: "USDC".to_string(),
                    decimals: 6,
                    ..Default::default()
                },
            )
            .with_global(GlobalContext {
                timestamp: 10,
                ..Default::default()
            })
    }

    #[tokio::test]
    async fn test_subscribers_see_latest_markets() {
        let publisher = Publisher::new();
        let mut markets = publisher.subscribe_markets();
        assert!(markets.borrow().is_empty());

        let mut session = Session::new(SessionConfig::new());
        publisher.publish(session.apply_snapshot(create_test_snapshot(), Instant::now()));

        markets.changed().await.unwrap();
        assert_eq!(markets.borrow_and_update().len(), 1);
        assert!(publisher.subscribe_user().borrow().is_some());
    }

    #[tokio::test]
    async fn test_simulation_error_published() {
        let publisher = Publisher::new();
        let mut errors = publisher.subscribe_simulation_error();
        let simulation = publisher.subscribe_simulation();

        let mut session = Session::new(SessionConfig::new());
        let now = Instant::now();
        publisher.publish(session.apply_snapshot(create_test_snapshot(), now));
        let unknown = Operation::supply(Address::repeat_byte(0xbb), U256::from(1u8));
        publisher.publish(session.set_operations(vec![unknown], now));

        errors.changed().await.unwrap();
        let error = *errors.borrow_and_update();
        assert_eq!(error.map(|e| e.kind), Some(SimulationErrorKind::UnknownMarket));
        assert!(simulation.borrow().is_none());
    }

    #[tokio::test]
    async fn test_reset_clears_simulation() {
        let publisher = Publisher::new();
        let mut simulation = publisher.subscribe_simulation();

        let mut session = Session::new(SessionConfig::new());
        let now = Instant::now();
        publisher.publish(session.apply_snapshot(create_test_snapshot(), now));
        publisher.publish(session.set_operations(
            vec![Operation::supply_collateral(market(), U256::ZERO)],
            now,
        ));
        simulation.changed().await.unwrap();
        assert!(simulation.borrow_and_update().is_some());

        publisher.publish(session.reset());
        simulation.changed().await.unwrap();
        assert!(simulation.borrow_and_update().is_none());
    }

    #[tokio::test]
    async fn test_subscriber_on_another_task() {
        let publisher = Publisher::new();
        let mut markets = publisher.subscribe_markets();
        let handle = tokio::spawn(async move {
            markets.changed().await.unwrap();
            let count = markets.borrow().len();
            count
        });

        let mut session = Session::new(SessionConfig::new());
        publisher.publish(session.apply_snapshot(create_test_snapshot(), Instant::now()));
        assert_eq!(handle.await.unwrap(), 1);
    }
}

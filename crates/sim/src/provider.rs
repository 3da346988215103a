//! Data provider capabilities.
//!
//! The models depend only on these traits, one per kind of data. Chain,
//! API or fixture backends implement them; [`StaticProvider`] serves a
//! snapshot held in memory or loaded from a JSON file.

use std::fs;
use std::path::Path;

use alloy_primitives::Address;
use tracing::debug;

use crate::error::ProviderError;
use crate::state::{
    GlobalContext, MarketConfig, ScaledMarketState, Snapshot, UserContext, UserScaledPosition,
};

/// A market's state together with its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMarket {
    pub state: ScaledMarketState,
    pub config: MarketConfig,
}

/// Fetches market states and configurations.
#[async_trait::async_trait]
pub trait MarketFetcher: Send + Sync {
    /// Every market as of `block` (latest when `None`).
    async fn fetch_markets(&self, block: Option<u64>)
        -> Result<Vec<FetchedMarket>, ProviderError>;
}

/// Fetches user positions and per-user context.
#[async_trait::async_trait]
pub trait UserFetcher: Send + Sync {
    /// The user's position on every market as of `block`.
    async fn fetch_positions(
        &self,
        user: Address,
        block: Option<u64>,
    ) -> Result<Vec<UserScaledPosition>, ProviderError>;

    /// Balances not tied to a market as of `block`.
    async fn fetch_user_context(
        &self,
        user: Address,
        block: Option<u64>,
    ) -> Result<UserContext, ProviderError>;
}

/// Fetches chain-level context.
#[async_trait::async_trait]
pub trait GlobalFetcher: Send + Sync {
    async fn fetch_global(&self, block: Option<u64>) -> Result<GlobalContext, ProviderError>;
}

/// Assembles a snapshot from the three capabilities.
///
/// The global context is fetched first and its block is used as the
/// reference point for markets and positions. User data is skipped when
/// `user` is `None`.
pub async fn fetch_snapshot<M, U, G>(
    markets: &M,
    users: &U,
    global: &G,
    user: Option<Address>,
    block: Option<u64>,
) -> Result<Snapshot, ProviderError>
where
    M: MarketFetcher + ?Sized,
    U: UserFetcher + ?Sized,
    G: GlobalFetcher + ?Sized,
{
    let global_context = global.fetch_global(block).await?;
    let block = Some(global_context.block);

    let mut snapshot = Snapshot::default().with_global(global_context);
    for market in markets.fetch_markets(block).await? {
        snapshot = snapshot.with_market(market.state, market.config);
    }

    if let Some(user) = user {
        snapshot.user = Some(users.fetch_user_context(user, block).await?);
        for position in users.fetch_positions(user, block).await? {
            snapshot = snapshot.with_position(position);
        }
    }

    debug!(
        block = global_context.block,
        markets = snapshot.markets.len(),
        positions = snapshot.positions.len(),
        "fetched snapshot"
    );

    Ok(snapshot)
}

/// In-memory provider serving a fixed snapshot.
///
/// The block argument is ignored: the snapshot is a single reference point.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    snapshot: Snapshot,
}

impl StaticProvider {
    /// Serve a snapshot held in memory.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Loads a snapshot serialized as JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&contents)?;
        debug!(
            path = %path.display(),
            markets = snapshot.markets.len(),
            positions = snapshot.positions.len(),
            "loaded snapshot file"
        );
        Ok(Self { snapshot })
    }

    /// The served snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn serves(&self, user: Address) -> bool {
        self.snapshot
            .user
            .is_none_or(|context| context.address == user)
    }
}

#[async_trait::async_trait]
impl MarketFetcher for StaticProvider {
    async fn fetch_markets(
        &self,
        _block: Option<u64>,
    ) -> Result<Vec<FetchedMarket>, ProviderError> {
        Ok(self
            .snapshot
            .markets
            .iter()
            .filter_map(|(address, state)| {
                self.snapshot.configs.get(address).map(|config| FetchedMarket {
                    state: state.clone(),
                    config: config.clone(),
                })
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl UserFetcher for StaticProvider {
    async fn fetch_positions(
        &self,
        user: Address,
        _block: Option<u64>,
    ) -> Result<Vec<UserScaledPosition>, ProviderError> {
        if !self.serves(user) {
            return Err(ProviderError::UnknownUser { user });
        }
        Ok(self.snapshot.positions.values().cloned().collect())
    }

    async fn fetch_user_context(
        &self,
        user: Address,
        _block: Option<u64>,
    ) -> Result<UserContext, ProviderError> {
        self.snapshot
            .user
            .filter(|context| context.address == user)
            .ok_or(ProviderError::UnknownUser { user })
    }
}

#[async_trait::async_trait]
impl GlobalFetcher for StaticProvider {
    async fn fetch_global(&self, _block: Option<u64>) -> Result<GlobalContext, ProviderError> {
        self.snapshot.global.ok_or(ProviderError::GlobalUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use std::io::Write;

    fn user() -> Address {
        Address::repeat_byte(0x11)
    }

    fn create_test_snapshot() -> Snapshot {
        let market = Address::repeat_byte(0xaa);
        let mut position = UserScaledPosition::empty(market);
        position.wallet_balance = U256::from(100u64);
        Snapshot::default()
            .with_market(
                ScaledMarketState::new(market, 10),
                MarketConfig {
                    underlying: market,
                    symbol: "USDC".to_string(),
                    decimals: 6,
                    ..Default::default()
                },
            )
            .with_position(position)
            .with_global(GlobalContext {
                block: 42,
                timestamp: 10,
                ..Default::default()
            })
            .with_user(UserContext {
                address: user(),
                ..Default::default()
            })
    }

    #[tokio::test]
    async fn test_fetch_snapshot_round_trips() {
        let snapshot = create_test_snapshot();
        let provider = StaticProvider::from_snapshot(snapshot.clone());
        let fetched = fetch_snapshot(&provider, &provider, &provider, Some(user()), None)
            .await
            .unwrap();
        assert_eq!(fetched, snapshot);
    }

    #[tokio::test]
    async fn test_fetch_snapshot_without_user() {
        let provider = StaticProvider::from_snapshot(create_test_snapshot());
        let fetched = fetch_snapshot(&provider, &provider, &provider, None, Some(7))
            .await
            .unwrap();
        assert!(fetched.user.is_none());
        assert!(fetched.positions.is_empty());
        assert_eq!(fetched.markets.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_user_is_error() {
        let provider = StaticProvider::from_snapshot(create_test_snapshot());
        let stranger = Address::repeat_byte(0x22);
        let result = provider.fetch_positions(stranger, None).await;
        assert!(matches!(result, Err(ProviderError::UnknownUser { user }) if user == stranger));
    }

    #[tokio::test]
    async fn test_missing_global_is_error() {
        let provider = StaticProvider::default();
        let result = fetch_snapshot(&provider, &provider, &provider, None, None).await;
        assert!(matches!(result, Err(ProviderError::GlobalUnavailable)));
    }

    #[test]
    fn test_from_json_file() {
        let snapshot = create_test_snapshot();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&snapshot).unwrap().as_bytes())
            .unwrap();

        let provider = StaticProvider::from_json_file(file.path()).unwrap();
        assert_eq!(provider.snapshot(), &snapshot);
    }

    #[test]
    fn test_from_json_file_errors() {
        let missing = StaticProvider::from_json_file("/nonexistent/snapshot.json");
        assert!(matches!(missing, Err(ProviderError::Io(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let invalid = StaticProvider::from_json_file(file.path());
        assert!(matches!(invalid, Err(ProviderError::Parse(_))));
    }
}

//! Shared application state accessible from all handlers.

use std::sync::Arc;

use domain::{ProductService, TicketService, UserService};
use store::Store;

use crate::config::Config;
use crate::health::{DatabaseProbe, HealthAggregator, RedisProbe, SysinfoMetrics};

pub struct AppState<S: Store> {
    pub config: Arc<Config>,
    pub tickets: TicketService<S>,
    pub products: ProductService<S>,
    pub users: UserService<S>,
    pub health: HealthAggregator,
}

impl<S: Store> AppState<S> {
    /// Builds the services over `store` with an explicit health aggregator.
    pub fn new(config: Config, store: S, health: HealthAggregator) -> Self {
        Self {
            tickets: TicketService::new(store.clone()),
            products: ProductService::new(store.clone()),
            users: UserService::with_cost(store, config.bcrypt_cost),
            health,
            config: Arc::new(config),
        }
    }

    /// Builds the services and a health aggregator probing `store`, the
    /// configured cache and the host.
    pub fn from_config(config: Config, store: S) -> Self {
        let mut health = HealthAggregator::new(
            config.environment.clone(),
            Arc::new(DatabaseProbe::new(store.clone())),
            Arc::new(SysinfoMetrics),
        )
        .with_probe_timeout(config.probe_timeout);

        if let Some(redis) = &config.redis {
            health = health.with_cache(Arc::new(RedisProbe::new(redis.addr(), redis.password.clone())));
        }

        Self::new(config, store, health)
    }
}

use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::{info, warn};

use ts_api::config::seed_users_from_env;
use ts_api::logging::init_logging;
use ts_api::{create_app, AppState, Stores};
use ts_core::clock::{Clock, SystemClock};
use ts_core::domain::entities::throttle::WindowPosition;
use ts_core::repositories::InMemoryUserRepository;
use ts_core::services::two_factor::RandomCodeGenerator;
use ts_infra::cache::{RedisChallengeStore, RedisClient, RedisThrottleStore};
use ts_infra::email::LogEmailChannel;
use ts_infra::memory::{MemoryChallengeStore, MemoryThrottleStore};
use ts_shared::{AppConfig, RateLimitConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("invalid configuration")?;
    init_logging(&config.logging)?;

    info!(environment = ?config.environment, "Starting Turnstile API server");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let stores = match &config.cache {
        Some(cache) => {
            let client = Arc::new(
                RedisClient::new(cache.clone())
                    .await
                    .context("failed to connect to Redis")?,
            );
            info!("Using Redis-backed throttle and challenge stores");
            Stores {
                throttle: Arc::new(RedisThrottleStore::new(client.clone())),
                challenges: Arc::new(RedisChallengeStore::new(client)),
            }
        }
        None => {
            let throttle = Arc::new(MemoryThrottleStore::new());
            spawn_throttle_sweeper(throttle.clone(), clock.clone(), config.rate_limit.clone());
            info!("REDIS_URL not set, using in-process stores");
            Stores {
                throttle,
                challenges: Arc::new(MemoryChallengeStore::new()),
            }
        }
    };

    let seeded = seed_users_from_env().context("invalid seed user")?;
    if seeded.is_empty() {
        warn!("No seed user configured; every login will be rejected");
    }
    let users = Arc::new(InMemoryUserRepository::with_users(seeded));

    let email = if config.environment.is_development() {
        LogEmailChannel::revealing_codes()
    } else {
        LogEmailChannel::new()
    };

    let state = AppState::build(
        &config,
        users,
        stores,
        Arc::new(email),
        Arc::new(RandomCodeGenerator),
        clock,
    )
    .context("failed to build application state")?;
    let state = web::Data::new(state);

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let mut server = HttpServer::new(move || create_app(state.clone()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }
    server.bind(&bind_address)?.run().await?;

    Ok(())
}

/// Periodically drop in-memory counters from finished windows
fn spawn_throttle_sweeper(store: Arc<MemoryThrottleStore>, clock: Arc<dyn Clock>, config: RateLimitConfig) {
    let window = chrono::Duration::seconds(config.window_seconds as i64);
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(config.window_seconds.max(1)));
        loop {
            interval.tick().await;
            let current = WindowPosition::locate(clock.now(), window).index;
            let removed = store.sweep(current);
            if removed > 0 {
                tracing::debug!(removed, "Swept stale throttle windows");
            }
        }
    });
}

use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::routes::{self, auth};
use service::{
    cache::{Clock, SampleQueriesCache, SamplesCacheConfig, SystemClock},
    policy::PolicyLoader,
    samples::SamplesService,
    storage::{BlobStore, FsBlobStore},
};

const DEV_JWT_SECRET: &str = "dev-secret-change-me";

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Wire the cache, policy loader and samples service over `store`.
pub fn build_state(cfg: &AppConfig, store: Arc<dyn BlobStore>, clock: Arc<dyn Clock>) -> auth::ServerState {
    let samples_cfg = &cfg.samples;
    let cache = SampleQueriesCache::new(
        Arc::clone(&store),
        clock,
        SamplesCacheConfig {
            container: samples_cfg.container.clone(),
            blob: samples_cfg.blob.clone(),
            refresh_hours: samples_cfg.refresh_hours(),
            max_locales: samples_cfg.cache_max_locales,
        },
    );
    info!(refresh = ?cache.refresh_interval(), "sample query cache ready");
    let policies = PolicyLoader::new(store, samples_cfg.policies_path.clone());

    let jwt_secret = if cfg.auth.jwt_secret.trim().is_empty() {
        warn!("auth.jwt_secret not set; using development secret");
        DEV_JWT_SECRET.to_string()
    } else {
        cfg.auth.jwt_secret.clone()
    };

    auth::ServerState {
        auth: auth::ServerAuthConfig { jwt_secret },
        samples: SamplesService::new(Arc::new(cache), policies),
        default_locale: samples_cfg.default_locale.clone(),
    }
}

/// Build the app over the configured data directory and serve it.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    common::env::ensure_data_dir(&cfg.storage.data_dir).await?;

    let store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(cfg.storage.data_dir.clone()));
    let state = build_state(&cfg, store, Arc::new(SystemClock));

    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg)?;
    info!(%addr, data_dir = %cfg.storage.data_dir, "starting samples server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

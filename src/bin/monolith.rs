//! Monolith Binary - Local deployment
//!
//! Entry point for local development and single-server deployment. It wires up:
//! - Local adapters (filesystem object store, Redis catalog)
//! - ffprobe/ffmpeg media inspection (in-process with the `native` feature)
//! - JWT bearer authentication
//! - The upload API plus static serving of stored assets under /assets

use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tubely::adapters::http::{router, AppState};
use tubely::adapters::local::{FsObjectStore, RedisPool};
use tubely::application::upload::UploadService;
use tubely::config::{AppConfig, LocalConfig};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let local = LocalConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if !config.delivery.is_local() {
        warn!(
            delivery = config.delivery.name(),
            "objects are written to the local assets root; returned URLs point elsewhere"
        );
    }

    for dir in [&config.assets_root, &config.scratch_dir] {
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "failed to create directory");
            std::process::exit(1);
        }
    }

    // 1. Adapters (Local implementations)
    let catalog = match RedisPool::new(&local.redis_url) {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "failed to connect to Redis");
            std::process::exit(1);
        }
    };

    let storage = FsObjectStore::new(&config.assets_root);

    #[cfg(feature = "native")]
    let media = match tubely::adapters::media::NativeMedia::new() {
        Ok(media) => media,
        Err(e) => {
            error!(error = %e, "failed to initialise ffmpeg");
            std::process::exit(1);
        }
    };
    #[cfg(not(feature = "native"))]
    let media = tubely::adapters::media::FfmpegCli::default();

    // 2. Application service
    let uploads = UploadService::new(storage, catalog, media, config.upload_settings());
    let state = AppState::new(uploads, config.identity());

    // 3. HTTP layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state)
        .nest_service("/assets", ServeDir::new(&config.assets_root))
        .layer(cors);

    // 4. Start server
    let listener = match tokio::net::TcpListener::bind(config.bind_addr()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind_addr(), error = %e, "failed to bind TCP listener");
            std::process::exit(1);
        }
    };
    info!(
        addr = %config.bind_addr(),
        delivery = config.delivery.name(),
        assets = %config.assets_root.display(),
        "listening"
    );

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        std::process::exit(1);
    }
}

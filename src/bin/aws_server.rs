//! AWS Server Binary
//!
//! Upload API backed by S3 for objects and DynamoDB for video records. Delivery
//! URLs point at the bucket (`DELIVERY_MODE=s3`) or a CloudFront distribution
//! (`DELIVERY_MODE=cdn`).
//!
//! Environment Variables:
//! - AWS_REGION: AWS region
//! - S3_BUCKET: S3 bucket for uploaded assets
//! - DYNAMODB_TABLE: DynamoDB table for video records
//! - JWT_SECRET: HS256 secret for access tokens

use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tubely::adapters::aws::{DynamoCatalog, S3ObjectStore};
use tubely::adapters::http::{router, AppState};
use tubely::application::upload::UploadService;
use tubely::config::{AppConfig, AwsConfig};

#[tokio::main]
async fn main() {
    let loaded = AppConfig::from_env().and_then(|c| Ok((c, AwsConfig::from_env()?)));
    let (config, aws) = match loaded {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if config.delivery.is_local() {
        warn!("DELIVERY_MODE=local has no /assets route in the AWS server");
    }

    if let Err(e) = tokio::fs::create_dir_all(&config.scratch_dir).await {
        error!(
            dir = %config.scratch_dir.display(),
            error = %e,
            "failed to create scratch directory"
        );
        std::process::exit(1);
    }

    // Load AWS config
    let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    // Create adapters
    let storage = S3ObjectStore::new(aws_sdk_s3::Client::new(&sdk_config), aws.s3_bucket);
    let catalog = DynamoCatalog::new(
        aws_sdk_dynamodb::Client::new(&sdk_config),
        aws.dynamodb_table,
    );

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

    let uploads = UploadService::new(storage, catalog, media, config.upload_settings());
    let state = AppState::new(uploads, config.identity());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = router(state).layer(cors);

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
        "listening"
    );

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        std::process::exit(1);
    }
}

//! Configuration for different deployment environments.
//!
//! Every binary loads [`AppConfig`]; the monolith adds [`LocalConfig`] and the
//! AWS server adds [`AwsConfig`].

use crate::adapters::auth::JwtIdentity;
use crate::application::upload::{UploadLimits, UploadSettings};
use crate::domain::delivery::DeliveryMode;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} env var required")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing(var))
}

fn or_default<F>(lookup: &F, var: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_lookup(var: &str) -> Option<String> {
    env::var(var).ok()
}

/// Settings shared by every deployment.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    /// HS256 secret for access tokens
    pub jwt_secret: String,
    /// Required `iss` claim, when set
    pub jwt_issuer: Option<String>,
    /// Directory for staged uploads and remux output
    pub scratch_dir: PathBuf,
    /// Root of the local object store, served under /assets
    pub assets_root: PathBuf,
    pub delivery: DeliveryMode,
    /// Ceiling for each probe or remux call
    pub media_timeout: Option<Duration>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = or_default(&lookup, "PORT", "8091");
        if port.parse::<u16>().is_err() {
            return Err(ConfigError::Invalid {
                var: "PORT",
                value: port,
            });
        }

        let delivery = match or_default(&lookup, "DELIVERY_MODE", "local").as_str() {
            "local" => DeliveryMode::Local {
                host: or_default(&lookup, "ASSETS_HOST", "localhost"),
                port: port.clone(),
            },
            "s3" => DeliveryMode::Direct {
                bucket: required(&lookup, "S3_BUCKET")?,
                region: required(&lookup, "S3_REGION")?,
            },
            "cdn" => DeliveryMode::Cdn {
                base: required(&lookup, "S3_CF_DISTRO")?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    var: "DELIVERY_MODE",
                    value: other.to_string(),
                })
            }
        };

        let media_timeout = match lookup("MEDIA_TIMEOUT_SECS").filter(|v| !v.is_empty()) {
            None => None,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "MEDIA_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
        };

        Ok(Self {
            addr: or_default(&lookup, "ADDR", "127.0.0.1"),
            port,
            jwt_secret: required(&lookup, "JWT_SECRET")?,
            jwt_issuer: lookup("JWT_ISSUER").filter(|v| !v.is_empty()),
            scratch_dir: lookup("SCRATCH_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            assets_root: PathBuf::from(or_default(&lookup, "ASSETS_ROOT", "./assets")),
            delivery,
            media_timeout,
        })
    }

    pub fn identity(&self) -> JwtIdentity {
        let identity = JwtIdentity::new(&self.jwt_secret);
        match &self.jwt_issuer {
            Some(issuer) => identity.with_issuer(issuer),
            None => identity,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }

    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            delivery: self.delivery.clone(),
            scratch_dir: self.scratch_dir.clone(),
            limits: UploadLimits::default(),
            media_timeout: self.media_timeout,
        }
    }
}

/// Configuration for local/monolith deployment.
#[cfg(feature = "local")]
#[derive(Clone, Debug)]
pub struct LocalConfig {
    /// Redis connection URL
    pub redis_url: String,
}

#[cfg(feature = "local")]
impl LocalConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            redis_url: or_default(&lookup, "REDIS_URL", "redis://127.0.0.1/"),
        }
    }
}

/// Configuration for AWS deployment.
#[cfg(feature = "aws")]
#[derive(Clone, Debug)]
pub struct AwsConfig {
    /// S3 bucket for uploaded assets
    pub s3_bucket: String,
    /// DynamoDB table holding video records
    pub dynamodb_table: String,
}

#[cfg(feature = "aws")]
impl AwsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            s3_bucket: required(&lookup, "S3_BUCKET")?,
            dynamodb_table: required(&lookup, "DYNAMODB_TABLE")?,
        })
    }
}

//! Configuration module
//!
//! Environment-driven configuration for the streaming service: storage
//! backend selection, CDN signing material and HTTP settings.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 3000;
const LIST_PAGE_SIZE: usize = 1000;
const SIGNED_URL_TTL_SECS: u64 = 3600;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// CDN signing material. The private key PEM never appears in `Debug` output.
#[derive(Clone)]
pub struct CdnConfig {
    pub domain: String,
    pub key_pair_id: String,
    pub private_key_pem: String,
}

impl fmt::Debug for CdnConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdnConfig")
            .field("domain", &self.domain)
            .field("key_pair_id", &self.key_pair_id)
            .field("private_key_pem", &"<redacted>")
            .finish()
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub http_concurrency_limit: usize,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub s3_prefix: Option<String>,
    pub list_page_size: usize,
    pub local_storage_path: Option<String>,
    // Streaming configuration
    pub default_video_key: Option<String>,
    pub cdn: Option<CdnConfig>,
    pub stream_via_cdn: bool,
    pub signed_url_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
            storage_backend: StorageBackend::Memory,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            s3_prefix: None,
            list_page_size: LIST_PAGE_SIZE,
            local_storage_path: None,
            default_video_key: None,
            cdn: None,
            stream_via_cdn: false,
            signed_url_ttl_secs: SIGNED_URL_TTL_SECS,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    non_empty_var(name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let storage_backend = match non_empty_var("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::S3,
        };

        let private_key_pem = match non_empty_var("CDN_PRIVATE_KEY") {
            // Single-line env values carry escaped newlines
            Some(pem) => Some(pem.replace("\\n", "\n")),
            None => match non_empty_var("CDN_PRIVATE_KEY_PATH") {
                Some(path) => Some(std::fs::read_to_string(&path).map_err(|e| {
                    anyhow::anyhow!("Failed to read CDN_PRIVATE_KEY_PATH {}: {}", path, e)
                })?),
                None => None,
            },
        };

        let domain = non_empty_var("CDN_DOMAIN");
        let key_pair_id = non_empty_var("CDN_KEY_PAIR_ID");
        let cdn = match (domain, key_pair_id, private_key_pem) {
            (Some(domain), Some(key_pair_id), Some(private_key_pem)) => Some(CdnConfig {
                domain,
                key_pair_id,
                private_key_pem,
            }),
            (None, None, None) => None,
            _ => {
                return Err(anyhow::anyhow!(
                    "CDN_DOMAIN, CDN_KEY_PAIR_ID and CDN_PRIVATE_KEY must be set together"
                ))
            }
        };

        Ok(Config {
            server_port: parse_var("PORT", SERVER_PORT),
            environment,
            cors_origins,
            http_concurrency_limit: parse_var("HTTP_CONCURRENCY_LIMIT", HTTP_CONCURRENCY_LIMIT),
            storage_backend,
            s3_bucket: non_empty_var("S3_BUCKET_NAME").or_else(|| non_empty_var("S3_BUCKET")),
            s3_region: non_empty_var("S3_REGION").or_else(|| non_empty_var("AWS_REGION")),
            s3_endpoint: non_empty_var("S3_ENDPOINT"),
            s3_prefix: non_empty_var("S3_PREFIX"),
            list_page_size: parse_var("LIST_PAGE_SIZE", LIST_PAGE_SIZE),
            local_storage_path: non_empty_var("LOCAL_STORAGE_PATH"),
            default_video_key: non_empty_var("DEFAULT_VIDEO_KEY"),
            cdn,
            stream_via_cdn: parse_var("STREAM_VIA_CDN", false),
            signed_url_ttl_secs: parse_var("SIGNED_URL_TTL_SECS", SIGNED_URL_TTL_SECS),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.signed_url_ttl_secs)
    }

    /// Fail fast on misconfiguration before any service is built.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("PORT cannot be 0"));
        }

        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.list_page_size == 0 {
            return Err(anyhow::anyhow!("LIST_PAGE_SIZE must be greater than 0"));
        }

        if self.signed_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!("SIGNED_URL_TTL_SECS must be greater than 0"));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET_NAME is required for the s3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION is required for the s3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH is required for the local storage backend"
                    ));
                }
            }
            StorageBackend::Memory => {}
        }

        if self.stream_via_cdn && self.cdn.is_none() {
            return Err(anyhow::anyhow!(
                "STREAM_VIA_CDN requires CDN_DOMAIN, CDN_KEY_PAIR_ID and CDN_PRIVATE_KEY"
            ));
        }

        Ok(())
    }
}

//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use vidcourse_core::Config;

/// Validate configuration, failing on anything that would break serving.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if !config.is_production() && config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
    }

    if config.cdn.is_some() && !config.stream_via_cdn {
        tracing::info!("CDN configured for signed URLs only; streaming reads from the origin store");
    }

    if config.default_video_key.is_none() {
        tracing::debug!("DEFAULT_VIDEO_KEY not set; the key-less stream route will return 400");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidcourse_core::config::CdnConfig;

    #[test]
    fn test_default_config_passes() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_stream_via_cdn_without_cdn_fails() {
        let config = Config {
            stream_via_cdn: true,
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_signing_only_cdn_passes() {
        let config = Config {
            cdn: Some(CdnConfig {
                domain: "cdn.example.com".to_string(),
                key_pair_id: "KEYID".to_string(),
                private_key_pem: "unused".to_string(),
            }),
            ..Config::default()
        };
        assert!(validate_config(&config).is_ok());
    }
}

//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `CLUBCTL_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `CLUBCTL_` override YAML values
//! 3. **DATABASE_URL** - Special case: overrides `database.url` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `CLUBCTL_WAITLIST__SWEEP_INTERVAL=1m` sets the `waitlist.sweep_interval` field.
//!
//! ## Configuration Structure
//!
//! See the repository's `config.yaml` for a complete example. Key sections:
//!
//! - **Server**: `host`, `port`, `public_url`
//! - **Database**: `database.url`, `database.pool`
//! - **Bootstrap**: `bootstrap_key` - initial platform staff key seeded on first startup
//! - **Messaging**: `messaging` - WhatsApp-style group messaging provider
//! - **Payments**: `payment` - Stripe (or dummy) checkout configuration
//! - **Waitlist**: `waitlist` - offer window, re-notification cooldown, sweep interval
//! - **Background services**: `background_services.capacity_sweeper`

use clap::Parser;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::Error;

/// Simple CLI args - just for specifying the config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "CLUBCTL_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// Loaded from YAML and environment variables; all fields have defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Base URL where the service is reachable from the outside
    /// (e.g., "https://app.example.com"). Used to build enrollment links.
    pub public_url: String,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Initial platform staff key seeded on first startup (optional).
    /// Platform keys can create clubs and mint club-scoped keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap_key: Option<String>,
    /// Outbound group messaging provider (WhatsApp-style HTTP API)
    pub messaging: MessagingConfig,
    /// Payment provider configuration (optional; payments disabled when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentConfig>,
    /// Waitlist subsystem tuning
    pub waitlist: WaitlistConfig,
    /// Background services configuration
    pub background_services: BackgroundServicesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3100,
            public_url: "http://localhost:3100".to_string(),
            database: DatabaseConfig::default(),
            bootstrap_key: None,
            messaging: MessagingConfig::default(),
            payment: None,
            waitlist: WaitlistConfig::default(),
            background_services: BackgroundServicesConfig::default(),
        }
    }
}

/// PostgreSQL connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection string for the database
    pub url: String,
    /// Connection pool settings
    pub pool: PoolSettings,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost:5432/clubctl".to_string(),
            pool: PoolSettings::default(),
        }
    }
}

/// Connection pool parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout_secs: 30,
        }
    }
}

/// Outbound messaging provider configuration.
///
/// The `whatsapp` provider posts templated text messages to a group chat
/// through a third-party HTTP API. The `dummy` provider records messages in
/// memory and is intended for development and tests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum MessagingConfig {
    Whatsapp(WhatsappConfig),
    Dummy,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        MessagingConfig::Dummy
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WhatsappConfig {
    /// Base URL of the messaging API (e.g., "https://gate.whapi.cloud")
    pub api_url: Url,
    /// Bearer token for the messaging API
    pub api_token: String,
    /// Default group chat identifier messages are sent to.
    /// Individual clubs can override this with their own group id.
    pub group_id: String,
    /// Request timeout for the outbound call
    #[serde(with = "humantime_serde", default = "default_messaging_timeout")]
    pub timeout: Duration,
}

fn default_messaging_timeout() -> Duration {
    Duration::from_secs(10)
}

/// Payment provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum PaymentConfig {
    Stripe(StripeConfig),
    Dummy(DummyPaymentConfig),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StripeConfig {
    /// Stripe secret API key
    pub api_key: String,
    /// Price ID for a class enrollment
    pub price_id: String,
    /// Webhook signing secret for `POST /webhooks/payments`
    pub webhook_secret: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DummyPaymentConfig {
    /// Amount every dummy checkout settles at
    pub amount: rust_decimal::Decimal,
}

impl Default for DummyPaymentConfig {
    fn default() -> Self {
        Self {
            amount: rust_decimal::Decimal::new(2500, 2), // 25.00
        }
    }
}

/// Waitlist subsystem tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaitlistConfig {
    /// How long a spot offer stays claimable after notification
    #[serde(with = "humantime_serde")]
    pub offer_window: Duration,
    /// Minimum gap between two sweep-triggered notifications for the same
    /// class. The manual staff trigger bypasses this.
    #[serde(with = "humantime_serde")]
    pub renotify_cooldown: Duration,
    /// How often the capacity sweeper runs
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
}

impl Default for WaitlistConfig {
    fn default() -> Self {
        Self {
            offer_window: Duration::from_secs(24 * 60 * 60),
            renotify_cooldown: Duration::from_secs(2 * 60 * 60),
            sweep_interval: Duration::from_secs(5 * 60),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackgroundServicesConfig {
    pub capacity_sweeper: SweeperConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweeperConfig {
    /// Whether the background capacity sweeper runs. When disabled, sweeps
    /// only happen via the manual staff endpoint (external cron setups).
    pub enabled: bool,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("CLUBCTL_").split("__"))
    }

    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        // DATABASE_URL wins over everything else, preserving pool settings
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database.url = url;
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if let MessagingConfig::Whatsapp(whatsapp) = &self.messaging {
            if whatsapp.api_token.is_empty() {
                return Err(Error::Internal {
                    operation: "Config validation: messaging.api_token must not be empty. \
                     Set CLUBCTL_MESSAGING__API_TOKEN or add it to the config file."
                        .to_string(),
                });
            }
            if whatsapp.group_id.is_empty() {
                return Err(Error::Internal {
                    operation: "Config validation: messaging.group_id must not be empty".to_string(),
                });
            }
        }

        if self.waitlist.offer_window.is_zero() || self.waitlist.sweep_interval.is_zero() {
            return Err(Error::Internal {
                operation: "Config validation: waitlist.offer_window and waitlist.sweep_interval must be non-zero".to_string(),
            });
        }

        if self.public_url.ends_with('/') {
            return Err(Error::Internal {
                operation: "Config validation: public_url must not end with a trailing slash".to_string(),
            });
        }

        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address(), "0.0.0.0:3100");
    }

    #[test]
    fn test_load_from_yaml_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
                port: 4000
                public_url: "https://academy.example.com"
                waitlist:
                  renotify_cooldown: 30m
                messaging:
                  provider: whatsapp
                  api_url: "https://gate.example.com"
                  api_token: "token-123"
                  group_id: "group@g.us"
                "#,
            )?;
            jail.set_env("CLUBCTL_PORT", "5000");

            let args = Args {
                config: "config.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args).expect("config should load");

            // Env var overrides YAML
            assert_eq!(config.port, 5000);
            assert_eq!(config.public_url, "https://academy.example.com");
            assert_eq!(config.waitlist.renotify_cooldown, Duration::from_secs(30 * 60));
            // Untouched values keep their defaults
            assert_eq!(config.waitlist.offer_window, Duration::from_secs(24 * 60 * 60));

            match config.messaging {
                MessagingConfig::Whatsapp(whatsapp) => {
                    assert_eq!(whatsapp.api_token, "token-123");
                    assert_eq!(whatsapp.group_id, "group@g.us");
                }
                MessagingConfig::Dummy => panic!("expected whatsapp messaging config"),
            }

            Ok(())
        });
    }

    #[test]
    fn test_validation_rejects_empty_messaging_token() {
        let mut config = Config::default();
        config.messaging = MessagingConfig::Whatsapp(WhatsappConfig {
            api_url: "https://gate.example.com".parse().unwrap(),
            api_token: String::new(),
            group_id: "group@g.us".to_string(),
            timeout: Duration::from_secs(10),
        });

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_trailing_slash_public_url() {
        let mut config = Config::default();
        config.public_url = "https://academy.example.com/".to_string();

        assert!(config.validate().is_err());
    }
}

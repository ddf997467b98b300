//! Configuration loading and management.
//!
//! Every field has a default, so an empty document (or no file at all) yields
//! the reference behaviour: 18% tax, free delivery from 4000, a 79 delivery fee,
//! 10 second tracking polls.

use crate::model::{Amount, Coupon};
use crate::pricing::CouponBook;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable the binary reads the config path from.
pub const CONFIG_ENV: &str = "ORDER_TRACKING_CONFIG";

/// Complete configuration of an [`OrderSystem`](crate::lifecycle::OrderSystem).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub store: StoreConfig,
    pub pricing: PricingConfig,
    pub coupons: CouponsConfig,
    pub tracking: TrackingConfig,
    pub admin: AdminConfig,
}

impl SystemConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {path}"))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("parsing config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by [`CONFIG_ENV`], or the defaults when unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_yaml_file(&path),
            Err(_) => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.pricing.tax_rate) {
            anyhow::bail!("pricing.tax_rate must be within [0, 1], got {}", self.pricing.tax_rate);
        }
        if self.pricing.base_delivery_fee < 0 || self.pricing.free_delivery_threshold < 0 {
            anyhow::bail!("pricing amounts must not be negative");
        }
        if self.tracking.poll_interval_ms == 0 || self.admin.refresh_interval_ms == 0 {
            anyhow::bail!("poll intervals must be positive");
        }
        Ok(())
    }
}

/// Sizing of the sharded order store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Number of order actors. Orders on different shards update in parallel.
    pub shards: usize,
    /// Request queue capacity per shard.
    pub buffer_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            shards: 4,
            buffer_size: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub tax_rate: f64,
    pub free_delivery_threshold: Amount,
    pub base_delivery_fee: Amount,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: 0.18,
            free_delivery_threshold: 4000,
            base_delivery_fee: 79,
        }
    }
}

/// Coupon codes keyed by code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponsConfig(pub HashMap<String, Coupon>);

impl Default for CouponsConfig {
    fn default() -> Self {
        Self(HashMap::from([
            ("SAVE10".to_string(), Coupon::percent(10.0)),
            ("FLAT100".to_string(), Coupon::fixed(100)),
        ]))
    }
}

impl CouponsConfig {
    pub fn book(&self) -> CouponBook {
        CouponBook::new(self.0.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub poll_interval_ms: u64,
    /// A fetch slower than this counts as a failed poll.
    pub fetch_timeout_ms: u64,
    /// Stops-away count shown when an order first goes out for delivery.
    pub initial_stops: u32,
    /// Directory for persisted snapshots. In-memory cache when absent.
    pub cache_dir: Option<PathBuf>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10_000,
            fetch_timeout_ms: 5_000,
            initial_stops: 5,
            cache_dir: None,
        }
    }
}

impl TrackingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub page_size: usize,
    pub auto_refresh: bool,
    pub refresh_interval_ms: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            auto_refresh: true,
            refresh_interval_ms: 15_000,
        }
    }
}

impl AdminConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

/// Connection pool settings.
///
/// Loaded from defaults overlaid with `NEOBOLT_*` environment variables,
/// e.g. `NEOBOLT_MAX_SIZE=10`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PoolConfig {
    /// Maximum number of connections the pool will open.
    pub max_size: u32,
    /// Idle connections to keep warm. `None` keeps `max_size` idle.
    pub min_idle: Option<u32>,
    /// How long `acquire` waits for a free connection.
    pub acquire_timeout_ms: u64,
    /// Idle connections older than this are closed. `None` disables eviction.
    pub idle_timeout_ms: Option<u64>,
    /// Validate a connection each time it is checked out.
    pub test_on_check_out: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 5,
            min_idle: None,
            acquire_timeout_ms: 30_000,
            idle_timeout_ms: Some(600_000),
            test_on_check_out: true,
        }
    }
}

impl PoolConfig {
    pub fn load() -> anyhow::Result<Self> {
        let defaults_json = serde_json::to_string(&Self::default())
            .with_context(|| "failed to serialize defaults")?;
        let settings = config::Config::builder()
            .add_source(
                config::File::from_str(&defaults_json, config::FileFormat::Json).required(false),
            )
            .add_source(config::Environment::with_prefix("NEOBOLT").try_parsing(true))
            .build()
            .with_context(|| "failed to load configuration")?;
        let cfg: PoolConfig = settings
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_size == 0 {
            return Err(anyhow!("PoolConfig.max_size must be greater than 0"));
        }
        if let Some(min_idle) = self.min_idle {
            if min_idle > self.max_size {
                return Err(anyhow!(
                    "PoolConfig.min_idle ({}) exceeds max_size ({})",
                    min_idle,
                    self.max_size
                ));
            }
        }
        Ok(())
    }
}

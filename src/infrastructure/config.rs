use crate::application::live_sync::DEFAULT_POLL_INTERVAL;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub live: LiveSettings,
    pub server: ServerSettings,
}

/// Remote analysis service
#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LiveSettings {
    pub poll_interval_ms: u64,
}

impl LiveSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_addr: String,
}

fn with_defaults() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    Ok(config::Config::builder()
        .set_default("api.base_url", "http://localhost:8000")?
        .set_default("api.timeout_ms", 5000_i64)?
        .set_default("live.poll_interval_ms", DEFAULT_POLL_INTERVAL.as_millis() as i64)?
        .set_default("server.bind_addr", "0.0.0.0:8080")?)
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("CARDIOSENSE").separator("__")
}

fn finish(builder: config::ConfigBuilder<config::builder::DefaultState>) -> anyhow::Result<Settings> {
    let settings: Settings = builder.build()?.try_deserialize()?;
    // tokio intervals panic on a zero period
    if settings.live.poll_interval_ms == 0 {
        anyhow::bail!("live.poll_interval_ms must be greater than zero");
    }
    Ok(settings)
}

/// Load `config/cardiosense.toml` (optional) with `CARDIOSENSE__*` environment overrides.
pub fn load_settings() -> anyhow::Result<Settings> {
    finish(
        with_defaults()?
            .add_source(config::File::with_name("config/cardiosense").required(false))
            .add_source(environment()),
    )
}

#[cfg(test)]
fn settings_from_toml(toml: &str) -> anyhow::Result<Settings> {
    finish(with_defaults()?.add_source(config::File::from_str(toml, config::FileFormat::Toml)))
}

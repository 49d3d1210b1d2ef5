use std::path::Path;

use crate::error::ConfigError;

use super::types::AppConfig;

const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Load configuration: defaults, then the TOML file, then `DLTRIGGER_*` env vars.
///
/// An explicit `path` must exist; without one, `config.toml` in the working
/// directory is used when present.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut cfg = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound(p.display().to_string()));
            }
            read_file(p)?
        }
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => read_file(Path::new(DEFAULT_CONFIG_FILE))?,
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    validate(&cfg)?;
    Ok(cfg)
}

fn read_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_str(&s)
}

pub fn parse_str(s: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str::<AppConfig>(s).map_err(ConfigError::Parse)
}

pub fn apply_env_overrides<F>(cfg: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("DLTRIGGER_HOST") {
        cfg.server.host = v;
    }
    if let Some(v) = get("DLTRIGGER_PORT") {
        cfg.server.port = parse_env("DLTRIGGER_PORT", &v)?;
    }
    if let Some(v) = get("DLTRIGGER_SCRIPT") {
        cfg.script.path = v;
    }
    if let Some(v) = lookup("DLTRIGGER_INTERPRETER") {
        // empty is meaningful here: run the script directly
        cfg.script.interpreter = v.trim().to_string();
    }
    if let Some(v) = get("DLTRIGGER_TIMEOUT_SECS") {
        cfg.script.timeout_secs = parse_env("DLTRIGGER_TIMEOUT_SECS", &v)?;
    }
    Ok(())
}

fn parse_env<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::EnvInvalid {
            key: key.to_string(),
            source: anyhow::Error::new(e),
        })
}

pub fn validate(cfg: &AppConfig) -> Result<(), ConfigError> {
    if cfg.server.port == 0 {
        return Err(ConfigError::Validation("server.port must be non-zero".into()));
    }
    if cfg.script.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "script.timeout_secs must be greater than zero".into(),
        ));
    }
    if cfg.script.path.trim().is_empty() {
        return Err(ConfigError::Validation("script.path must not be empty".into()));
    }
    Ok(())
}

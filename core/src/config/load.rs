use std::path::{Path, PathBuf};

use super::types::AppConfig;

/// Default benchrelay data directory: ~/.benchrelay
pub fn data_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(PathBuf::from(home).join(".benchrelay"))
}

/// Load the configuration with layered precedence:
/// `~/.benchrelay/config.toml`, then `./config.toml`, then built-in
/// defaults. `BENCHRELAY_*` environment variables override file values.
pub fn load_default() -> anyhow::Result<AppConfig> {
    let home_config = data_dir()?.join("config.toml");
    let local_config = Path::new("config.toml");

    let mut cfg: AppConfig = if home_config.exists() {
        let s = std::fs::read_to_string(&home_config)?;
        toml::from_str::<AppConfig>(&s)?
    } else if local_config.exists() {
        let s = std::fs::read_to_string(local_config)?;
        toml::from_str::<AppConfig>(&s)?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

fn apply_env_overrides(cfg: &mut AppConfig) {
    if let Some(v) = env_nonempty("BENCHRELAY_RUNNER_PATH") {
        cfg.runner.path = Some(v);
    }
    if let Some(v) = env_nonempty("BENCHRELAY_OUTPUT_DIR") {
        cfg.runner.default_output_dir = Some(v);
    }
    if let Some(v) = env_nonempty("BENCHRELAY_ANALYTICS_URL") {
        cfg.upload.analytics.base_url = v;
    }
    if let Some(v) = env_nonempty("BENCHRELAY_ANALYTICS_API_KEY") {
        cfg.upload.analytics.api_key = v;
    }
    if let Some(v) = env_nonempty("BENCHRELAY_BLOB_URL") {
        cfg.upload.blob.base_url = v;
    }
    if let Some(v) = env_nonempty("BENCHRELAY_BLOB_API_KEY") {
        cfg.upload.blob.api_key = v;
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default configuration file stem, resolved against every format `config` supports.
pub const DEFAULT_CONFIG_FILE: &str = "cutout";
/// Environment prefix; nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "CUTOUT";

/// Custom error type for config loading.
#[cutout_derive::cutout_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads layered configuration: a file overlaid by `CUTOUT__` environment variables.
///
/// 1. **Base File**: `path` if given (then it must exist), otherwise an optional `cutout.*`
///    file in the working directory.
/// 2. **Environment Overrides**: `CUTOUT__REMOVAL__API_KEY` maps to `removal.api_key`.
///
/// # Errors
/// Returns [`ConfigError::Config`] if an explicitly named file is missing or the merged
/// sources do not match `T`.
///
/// # Example
/// ```rust
/// use cutout_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// #[serde(default)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(None::<&str>).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let required = path.is_some();
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX).separator("__").convert_case(config::Case::Snake),
        );

    info!(path = %effective_path.display(), required, "Loading configuration");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

use config::{Config, Environment, File};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::Path;
use tracing::info;

/// Environment prefix for configuration overrides, e.g. `WEAVE__PLUGIN__DEPRECATION_WARNINGS`.
pub const ENV_PREFIX: &str = "WEAVE";

/// Base name of the configuration file looked up when no path is given.
pub const DEFAULT_CONFIG: &str = "weave";

/// Options accepted by [`wire_plugin`](crate::plugin::wire_plugin).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PluginOptions {
    /// Log a warning when a deprecated factory or facet is used.
    pub deprecation_warnings: bool,
    pub destroy: DestroyOptions,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self { deprecation_warnings: true, destroy: DestroyOptions::default() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DestroyOptions {
    /// Keep draining after a failed destroy handler and report the first failure at the end.
    pub continue_on_error: bool,
}

#[weave_derive::weave_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads a configuration structure from a file layered under environment overrides.
///
/// 1. **File**: `path` when given (must exist), otherwise an optional `weave.*`
///    file in the working directory. The format follows the extension.
/// 2. **Environment**: variables prefixed with `WEAVE__`, nested with `__`
///    (`WEAVE__PLUGIN__DESTROY__CONTINUE_ON_ERROR` maps to `plugin.destroy.continue_on_error`).
///
/// # Errors
/// Returns [`ConfigError`] if a given file is missing or the merged sources do
/// not deserialize into `T`.
///
/// # Example
/// ```rust
/// use weave_base::config::{load_options, PluginOptions};
///
/// let options: PluginOptions = load_options(None::<&str>).unwrap_or_default();
/// assert!(options.deprecation_warnings);
/// ```
pub fn load_options<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let file = match &path {
        Some(path) => {
            info!("Loading config from {}", path.as_ref().display());
            File::from(path.as_ref()).required(true)
        },
        None => File::with_name(DEFAULT_CONFIG).required(false),
    };

    let config = Config::builder()
        .add_source(file)
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let options = PluginOptions::default();
        assert!(options.deprecation_warnings);
        assert!(!options.destroy.continue_on_error);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().expect("temp file");
        write!(file, r#"{{ "destroy": {{ "continue_on_error": true }} }}"#).expect("write config");

        let options: PluginOptions = load_options(Some(file.path())).expect("load");

        assert!(options.deprecation_warnings);
        assert!(options.destroy.continue_on_error);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_options::<PluginOptions>(Some(dir.path().join("absent.toml")))
            .expect_err("missing file");
        assert_eq!(err.kind(), "Config");
    }
}

pub mod generate;
pub mod parse;
pub mod types;

use regex::{Captures, Regex};
use std::path::{Path, PathBuf};

pub use parse::{load_config, parse_config, ConfigError};
pub use types::{Config, Location, SourceConfig, TransportConfig, WebConfig};

const USER_CONFIG: &str = ".config/logtally/config.yml";
const SYSTEM_CONFIG: &str = "/etc/logtally/config.yml";

/// Expands `$env{VAR_NAME}` references. Unset variables are left as written.
pub fn expand_env_vars(text: &str) -> String {
    let re = Regex::new(r"\$env\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();

    re.replace_all(text, |caps: &Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}

/// Replaces a leading `~` with the home directory when it can be determined.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home) if rest.as_os_str().is_empty() => home,
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Resolves the config file path. Returns the first of:
/// 1. Explicit path (with tilde expansion)
/// 2. ~/.config/logtally/config.yml, if present
/// 3. /etc/logtally/config.yml, if present
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(expand_tilde(path));
    }

    if let Some(user_config) = user_config_path().filter(|p| p.exists()) {
        return Some(user_config);
    }

    let system_config = PathBuf::from(SYSTEM_CONFIG);
    system_config.exists().then_some(system_config)
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(USER_CONFIG))
}

pub fn system_config_path() -> PathBuf {
    PathBuf::from(SYSTEM_CONFIG)
}

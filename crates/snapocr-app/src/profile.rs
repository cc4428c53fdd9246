use std::path::Path;

use snapocr_config::Config;

/// Profile picked up from the working directory when no path is given
const DEFAULT_PROFILE: &str = "snapocr.json";

/// Load the config from `path`, the default profile, or env defaults
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => {
            tracing::info!("Loading profile {}", path.display());
            Config::from_file(path)?
        }
        None if Path::new(DEFAULT_PROFILE).exists() => {
            tracing::info!("Loading profile {}", DEFAULT_PROFILE);
            Config::from_file(Path::new(DEFAULT_PROFILE))?
        }
        None => {
            tracing::info!("No profile found, using defaults");
            Config::new()
        }
    };

    config.validate()?;
    Ok(config)
}

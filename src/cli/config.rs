use crate::config::generate::generate_starter_config;
use crate::config::{system_config_path, user_config_path};
use std::fs;
use std::path::{Path, PathBuf};

pub fn init(stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_content = generate_starter_config();

    if stdout {
        print!("{}", config_content);
        return Ok(());
    }

    let config_path = choose_config_path();

    if config_path.exists() {
        return Err(format!(
            "config file already exists at {}; remove it first or use --stdout",
            config_path.display()
        )
        .into());
    }

    write_config(&config_path, &config_content)?;
    println!("Config written to {}", config_path.display());

    Ok(())
}

/// Prefer the user config location, falling back to the system one when the
/// user directory cannot be created.
fn choose_config_path() -> PathBuf {
    if let Some(user_config) = user_config_path() {
        match user_config.parent().map(fs::create_dir_all) {
            Some(Ok(())) | None => return user_config,
            Some(Err(e)) => {
                eprintln!("Warning: could not create {}: {}", user_config.display(), e);
                eprintln!("Falling back to {}", system_config_path().display());
            }
        }
    }

    system_config_path()
}

fn write_config(path: &Path, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("failed to create directory {}: {}", parent.display(), e))?;
    }

    fs::write(path, content)
        .map_err(|e| format!("failed to write config to {}: {}", path.display(), e))?;

    Ok(())
}

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::Path;

// Values of these keys never reach the log.
const SECRET_KEYS: &[&str] = &["PLATFORM_API_TOKEN"];

/// Loads the first `.env` file found; variables already set in the process win.
pub fn load_env() {
    let env_paths = [".env", ".env.local", "../.env"];
    let mut loaded_env = false;
    for path in env_paths.iter() {
        if Path::new(path).exists() {
            if let Err(e) = load_env_from_file(path) {
                warn!("Failed to load environment from {}: {}", path, e);
            } else {
                info!("Loaded environment variables from {}", path);
                loaded_env = true;
                break;
            }
        }
    }
    if !loaded_env {
        info!("No .env file found, using environment variables from system");
    }
}

/// Splits one `KEY=value` line; comments and blank lines yield `None`.
pub fn parse_env_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.starts_with('#') || line.is_empty() {
        return None;
    }
    let idx = line.find('=')?;
    let key = line[..idx].trim();
    if key.is_empty() {
        return None;
    }
    let value = line[idx + 1..].trim().trim_matches('"');
    Some((key, value))
}

fn load_env_from_file(file_path: &str) -> Result<()> {
    use std::fs::File;
    use std::io::{BufRead, BufReader};

    debug!("Attempting to load environment variables from: {}", file_path);
    let file = File::open(file_path).with_context(|| format!("Could not open env file '{}'", file_path))?;
    let reader = BufReader::new(file);
    for line in reader.lines() {
        let line = line.context("Failed to read line from env file")?;
        if let Some((key, value)) = parse_env_line(&line) {
            if std::env::var(key).is_err() {
                std::env::set_var(key, value);
                debug!(
                    "Set env var from file: {} = {}",
                    key,
                    if SECRET_KEYS.contains(&key) { "[hidden]" } else { value }
                );
            }
        }
    }
    Ok(())
}

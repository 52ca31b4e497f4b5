//! Configuration file handling
//!
//! The file is plain TOML deserialized into a [`SessionConfig`]:
//!
//! ```toml
//! host = "192.168.1.20"
//! port = 3636
//! api_key = "secret"
//!
//! [transport]
//! keepalive_secs = 0
//! ```

use anyhow::{bail, Context, Result};
use lightpack_client::SessionConfig;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `$CONFIG_DIR/lightpack/config.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lightpack").join("config.toml"))
}

/// Load the configuration
///
/// An explicit path must exist. The default path is optional and falls back
/// to built-in defaults when missing.
pub fn load(explicit: Option<&Path>) -> Result<SessionConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            path.to_path_buf()
        }
        None => match default_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(SessionConfig::default()),
        },
    };

    debug!("Loading config from {}", path.display());
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
}

pub fn parse(text: &str) -> Result<SessionConfig> {
    Ok(toml::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse("host = \"10.0.0.5\"").unwrap();
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.port, 3636);
        assert!(config.api_key.is_none());
        assert_eq!(config.transport.max_line_size, 8192);
    }

    #[test]
    fn test_full_file() {
        let config = parse(
            r#"
            host = "lightpack.local"
            port = 4000
            api_key = "secret"

            [transport]
            max_line_size = 1024
            keepalive_secs = 0
            nodelay = false
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.transport.keepalive_secs, 0);
        assert!(!config.transport.nodelay);
    }

    #[test]
    fn test_bad_types_rejected() {
        assert!(parse("port = \"high\"").is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 3700").unwrap();

        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.port, 3700);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("nope.toml"))).is_err());
    }
}

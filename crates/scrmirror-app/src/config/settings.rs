//! Settings parser for .scrmirror/config.toml

use super::types::Settings;
use scrmirror_core::prelude::*;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.toml";
const SCRMIRROR_DIR: &str = ".scrmirror";

/// Path of the config file below `base_dir`
pub fn config_path(base_dir: &Path) -> PathBuf {
    base_dir.join(SCRMIRROR_DIR).join(CONFIG_FILENAME)
}

/// Load settings from `.scrmirror/config.toml`
///
/// A missing, unreadable or malformed file yields the defaults.
pub fn load_settings(base_dir: &Path) -> Settings {
    let config_path = config_path(base_dir);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match parse_settings(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Parse the contents of a config file
pub fn parse_settings(content: &str) -> Result<Settings> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_config(base: &Path, content: &str) {
        let dir = base.join(SCRMIRROR_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILENAME), content).unwrap();
    }

    #[test]
    fn test_load_settings_defaults() {
        let temp = tempdir().unwrap();
        let settings = load_settings(temp.path());

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_settings_custom() {
        let temp = tempdir().unwrap();
        write_config(
            temp.path(),
            r#"
[reconnect]
max_attempts = 5

[session]
max_sessions = 4
progress_history = 16

[engine]
mailbox_capacity = 32
shutdown_timeout_ms = 500
"#,
        );

        let settings = load_settings(temp.path());

        assert_eq!(settings.reconnect.max_attempts, 5);
        assert_eq!(settings.session.max_sessions, 4);
        assert_eq!(settings.session.progress_history, 16);
        assert_eq!(settings.engine.mailbox_capacity, 32);
        assert_eq!(settings.engine.event_capacity, 256);
        assert_eq!(settings.engine.shutdown_timeout_ms, 500);
    }

    #[test]
    fn test_load_settings_invalid_toml() {
        let temp = tempdir().unwrap();
        write_config(temp.path(), "[reconnect\nmax_attempts = ");

        let settings = load_settings(temp.path());

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_settings_wrong_type_falls_back() {
        let temp = tempdir().unwrap();
        write_config(temp.path(), "[reconnect]\nmax_attempts = \"many\"\n");

        let settings = load_settings(temp.path());

        assert_eq!(settings.reconnect.max_attempts, 3);
    }

    #[test]
    fn test_parse_settings_reports_toml_errors() {
        let err = parse_settings("[session]\nexception_history = -1\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));

        let settings = parse_settings("[session]\nexception_history = 5\n").unwrap();
        assert_eq!(settings.session.exception_history, 5);
    }

    #[test]
    fn test_config_path() {
        let path = config_path(Path::new("/tmp/project"));
        assert_eq!(path, PathBuf::from("/tmp/project/.scrmirror/config.toml"));
    }
}

//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_file_parses_sections() {
        let file = create_temp_config(
            "[backtest]\ninitial_budget = 25000\nverbose = yes\n\n[data]\ndirectory = history\n",
        );
        let config = FileConfigAdapter::from_file(file.path()).unwrap();

        assert!((config.get_double("backtest", "initial_budget", 0.0) - 25_000.0).abs() < 1e-9);
        assert!(config.get_bool("backtest", "verbose", false));
        assert_eq!(
            config.get_string("data", "directory"),
            Some("history".to_string())
        );
    }

    #[test]
    fn from_string_parses_config() {
        let config = FileConfigAdapter::from_string("[download]\nperiod = 2y\ndelay_ms = 250\n")
            .unwrap();
        assert_eq!(config.get_string("download", "period"), Some("2y".to_string()));
        assert_eq!(config.get_int("download", "delay_ms", 1000), 250);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = FileConfigAdapter::from_string("[backtest]\n").unwrap();
        assert_eq!(config.get_string("backtest", "risk_basis"), None);
        assert_eq!(config.get_int("backtest", "sma_period", 9), 9);
        assert!((config.get_double("backtest", "budget_use", 0.5) - 0.5).abs() < f64::EPSILON);
        assert!(!config.get_bool("backtest", "verbose", false));
    }

    #[test]
    fn bool_accepts_common_spellings() {
        let config = FileConfigAdapter::from_string(
            "[output]\na = true\nb = YES\nc = 1\nd = false\ne = No\nf = 0\ng = maybe\n",
        )
        .unwrap();
        assert!(config.get_bool("output", "a", false));
        assert!(config.get_bool("output", "b", false));
        assert!(config.get_bool("output", "c", false));
        assert!(!config.get_bool("output", "d", true));
        assert!(!config.get_bool("output", "e", true));
        assert!(!config.get_bool("output", "f", true));
        assert!(config.get_bool("output", "g", true));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(FileConfigAdapter::from_file("/nonexistent/config.ini").is_err());
    }
}

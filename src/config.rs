use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};

const CONFIG_DIRECTORY: &str = "tonearm";
const CONFIG_FILENAME: &str = "config.toml";
const DATABASE_FILENAME: &str = "tonearm.db";
const LOG_FILENAME: &str = "tonearm.log";

/// Daemon settings, read from `<config_dir>/tonearm/config.toml`.
/// Every field is optional in the file; missing fields keep their
/// defaults, and a missing or unreadable file yields pure defaults.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub db_path: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
    pub ytdlp_path: String,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub search_timeout_secs: u64,
    pub server_port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            db_path: None,
            log_path: None,
            ytdlp_path: "yt-dlp".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            search_timeout_secs: 60,
            server_port: 3131,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        let Some(path) = Self::config_dir().map(|d| d.join(CONFIG_FILENAME)) else {
            return Settings::default();
        };

        match fs::read_to_string(&path) {
            Ok(raw) => toml::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("ignoring malformed {}: {e}", path.display());
                Settings::default()
            }),
            Err(_) => Settings::default(),
        }
    }

    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIRECTORY))
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(|| {
            Self::config_dir()
                .expect("Config folder not present on system!")
                .join(DATABASE_FILENAME)
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_path.clone().unwrap_or_else(|| {
            Self::config_dir()
                .expect("Config folder not present on system!")
                .join(LOG_FILENAME)
        })
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let settings: Settings = toml::from_str("search_timeout_secs = 5").unwrap();
        assert_eq!(settings.search_timeout(), Duration::from_secs(5));
        assert_eq!(settings.ytdlp_path, "yt-dlp");
        assert_eq!(settings.server_port, 3131);
    }

    #[test]
    fn explicit_paths_win() {
        let settings: Settings =
            toml::from_str("db_path = \"/tmp/elsewhere.db\"\nserver_port = 4000").unwrap();
        assert_eq!(settings.db_path(), PathBuf::from("/tmp/elsewhere.db"));
        assert_eq!(settings.server_port, 4000);
    }
}

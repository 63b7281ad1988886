//! Application-level configuration loading: where the state lives, how the screen ticks and what
//! the default display state looks like.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::display::{DEFAULT_MESSAGE, DisplayState, MAX_TEAMS, Rgb, Team, default_teams};

/// Default location on disk where the binaries look for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SCOREBOARD_CONFIG_PATH";
/// Environment variable that overrides the configured state file location.
const STATE_PATH_ENV: &str = "SCOREBOARD_STATE_PATH";
/// State file used when none is configured.
const DEFAULT_STATE_PATH: &str = "state.json";
/// Screen refresh rate used when none is configured.
const DEFAULT_RENDER_HZ: u32 = 60;
const MAX_RENDER_HZ: u32 = 120;

/// Backend holding the shared display state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// JSON file shared between processes.
    #[default]
    File,
    /// Process-local memory; only useful with the embedded screen.
    Memory,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    state_path: PathBuf,
    store: StoreKind,
    render_hz: u32,
    embedded_screen: bool,
    default_message: String,
    default_teams: Vec<Team>,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults, then apply the
    /// environment overrides.
    pub fn load() -> Self {
        let mut config = Self::load_from(&resolve_config_path());
        if let Some(state_path) = env::var_os(STATE_PATH_ENV).filter(|value| !value.is_empty()) {
            config.state_path = PathBuf::from(state_path);
        }
        config
    }

    /// Load the configuration file at `path`, falling back to built-in defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        state_path = %app_config.state_path.display(),
                        store = ?app_config.store,
                        "loaded config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Location of the shared state file.
    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Selected storage backend.
    pub fn store(&self) -> StoreKind {
        self.store
    }

    /// Whether the server runs the screen loop itself.
    pub fn embedded_screen(&self) -> bool {
        self.embedded_screen
    }

    /// Screen refresh rate in ticks per second.
    pub fn render_hz(&self) -> u32 {
        self.render_hz
    }

    /// Interval between two screen ticks.
    pub fn render_interval(&self) -> Duration {
        Duration::from_secs(1) / self.render_hz
    }

    /// State written when the store holds nothing usable.
    pub fn default_state(&self) -> DisplayState {
        DisplayState::with_payload(self.default_message.clone(), self.default_teams.clone())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            store: StoreKind::default(),
            render_hz: DEFAULT_RENDER_HZ,
            embedded_screen: false,
            default_message: DEFAULT_MESSAGE.into(),
            default_teams: default_teams(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    state_path: Option<PathBuf>,
    #[serde(default)]
    store: StoreKind,
    render_hz: Option<u32>,
    #[serde(default)]
    embedded_screen: bool,
    default_message: Option<String>,
    default_teams: Option<Vec<RawTeam>>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let mut default_teams: Vec<Team> = value
            .default_teams
            .map(|teams| teams.into_iter().map(Into::into).collect())
            .unwrap_or_else(default_teams);
        if default_teams.len() > MAX_TEAMS {
            warn!(
                count = default_teams.len(),
                "config lists more than {MAX_TEAMS} default teams; extra entries ignored"
            );
            default_teams.truncate(MAX_TEAMS);
        }

        Self {
            state_path: value
                .state_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH)),
            store: value.store,
            render_hz: value
                .render_hz
                .unwrap_or(DEFAULT_RENDER_HZ)
                .clamp(1, MAX_RENDER_HZ),
            embedded_screen: value.embedded_screen,
            default_message: value
                .default_message
                .unwrap_or_else(|| DEFAULT_MESSAGE.into()),
            default_teams,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of a default team inside the configuration file.
struct RawTeam {
    name: String,
    color: RawColor,
}

#[derive(Debug, Deserialize)]
/// JSON representation of a single RGB entry inside the configuration file.
struct RawColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl From<RawTeam> for Team {
    fn from(value: RawTeam) -> Self {
        Team::new(
            value.name,
            0,
            Rgb::new(value.color.red, value.color.green, value.color.blue),
        )
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.json"));
        assert_eq!(config.state_path(), Path::new("state.json"));
        assert_eq!(config.store(), StoreKind::File);
        assert_eq!(config.render_hz(), 60);
        assert_eq!(config.default_state(), DisplayState::default());
    }

    #[test]
    fn file_overrides_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        fs::write(
            &path,
            r#"{
                "state_path": "/run/scoreboard/state.json",
                "store": "memory",
                "render_hz": 500,
                "embedded_screen": true,
                "default_message": "Hallo",
                "default_teams": [
                    {"name": "Heim", "color": {"red": 1, "green": 2, "blue": 3}}
                ]
            }"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config.state_path(), Path::new("/run/scoreboard/state.json"));
        assert_eq!(config.store(), StoreKind::Memory);
        assert_eq!(config.render_hz(), 120);
        assert!(config.embedded_screen());

        let defaults = config.default_state();
        assert_eq!(defaults.message, "Hallo");
        assert_eq!(defaults.teams, vec![Team::new("Heim", 0, Rgb::new(1, 2, 3))]);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        fs::write(&path, "{ not json").unwrap();
        let config = AppConfig::load_from(&path);
        assert_eq!(config.render_hz(), 60);
        assert!(!config.embedded_screen());
    }

    #[test]
    fn render_interval_follows_rate() {
        let config = AppConfig {
            render_hz: 50,
            ..AppConfig::default()
        };
        assert_eq!(config.render_interval(), Duration::from_millis(20));
    }
}

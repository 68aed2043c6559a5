//! Runtime configuration loaded from `config.toml` in the relay home.
//!
//! ```toml
//! [composer]
//! debounce_ms = 300
//! master_detail = false
//!
//! [room]
//! id = "GENERAL"
//! name = "general"
//! type = "c"
//!
//! [[commands]]
//! command = "giphy"
//! provides_preview = true
//!
//! [directory]
//! users = [{ username = "john", name = "John Doe" }]
//! emoji = ["smile", "tada"]
//! ```
//!
//! Every section is optional; a missing file yields [`Config::default`].

use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::RelayErr;
use crate::Result;
use crate::commands::SlashCommandRecord;
use crate::room::RoomSubscription;
use crate::room::RoomType;
use crate::services::Message;

pub const CONFIG_TOML_FILE: &str = "config.toml";
const RELAY_HOME_ENV: &str = "RELAY_HOME";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub composer: ComposerSettings,
    pub room: RoomSettings,
    pub commands: Vec<SlashCommandRecord>,
    pub directory: Directory,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComposerSettings {
    /// Quiet period before the autocomplete trigger is re-evaluated.
    pub debounce_ms: u64,
    /// Whether navigation opens screens as modals (tablet layout).
    pub master_detail: bool,
    /// Show the markdown toolbar when the composer opens.
    pub show_markdown_toolbar: bool,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            master_detail: false,
            show_markdown_toolbar: false,
        }
    }
}

impl ComposerSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// The room the terminal client opens when no CLI override is given.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoomSettings {
    pub id: String,
    pub name: String,
    pub fname: Option<String>,
    #[serde(rename = "type")]
    pub room_type: RoomType,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            id: "GENERAL".to_string(),
            name: "general".to_string(),
            fname: None,
            room_type: RoomType::Channel,
        }
    }
}

impl RoomSettings {
    pub fn subscription(&self) -> RoomSubscription {
        RoomSubscription {
            id: self.id.clone(),
            name: self.name.clone(),
            fname: self.fname.clone(),
            room_type: self.room_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirectoryUser {
    #[serde(default)]
    pub id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CannedResponse {
    pub shortcut: String,
    pub text: String,
}

/// Local stand-in for the server's user, room, emoji and canned-response
/// directories.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Directory {
    pub users: Vec<DirectoryUser>,
    pub rooms: Vec<RoomSubscription>,
    pub emoji: Vec<String>,
    pub canned_responses: Vec<CannedResponse>,
    pub messages: Vec<Message>,
}

impl Config {
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// `$RELAY_HOME` when set, otherwise `~/.relay`.
pub fn find_relay_home() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(RELAY_HOME_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    let mut home = dirs::home_dir().ok_or(RelayErr::MissingHome)?;
    home.push(".relay");
    Ok(home)
}

pub fn log_dir(relay_home: &Path) -> PathBuf {
    relay_home.join("log")
}

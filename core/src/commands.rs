//! Slash command metadata and invocation parsing.

use regex_lite::Regex;
use serde::Deserialize;
use serde::Serialize;
use std::sync::LazyLock;
use uuid::Uuid;

// `/command params`: the command name followed by a single space and at
// least one character of parameters on the first line.
static COMMAND_WITH_PARAMS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"(?i)^/([a-z0-9._-]+) (.+)"));

fn compile_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        // Panic is ok thanks to `load_regex` test.
        Err(err) => panic!("invalid regex pattern `{pattern}`: {err}"),
    }
}

/// A slash command registered on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashCommandRecord {
    /// Command name without the leading `/`.
    pub command: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the command shows previews before it is executed.
    #[serde(default)]
    pub provides_preview: bool,
    /// The app that registered the command, if any.
    #[serde(default)]
    pub app_id: Option<String>,
    /// Static preview items offered for commands that provide previews.
    #[serde(default)]
    pub previews: Vec<CommandPreviewItem>,
}

impl SlashCommandRecord {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            description: None,
            provides_preview: false,
            app_id: None,
            previews: Vec::new(),
        }
    }
}

/// One preview entry returned for a previewable command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandPreviewItem {
    pub id: String,
    pub value: String,
}

/// Split `/command params` into `(command, params)`.
///
/// Returns `None` when the text is not a command followed by parameters.
pub fn parse_command_invocation(text: &str) -> Option<(&str, &str)> {
    let captures = COMMAND_WITH_PARAMS_REGEX.captures(text)?;
    let command = captures.get(1)?.as_str();
    let params = captures.get(2)?.as_str();
    Some((command, params))
}

/// Identifier attached to a command execution so the server can correlate
/// interactions coming back from the app that owns the command.
pub fn generate_trigger_id(app_id: Option<&str>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    match app_id {
        Some(app_id) => format!("{random}:{app_id}"),
        None => random,
    }
}

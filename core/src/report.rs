//! Reporting a user to the room's moderators.

use crate::RelayErr;
use crate::Result;
use crate::services::RoomServices;

/// Parameters the report screen is opened with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportUserParams {
    pub username: String,
    pub room_id: String,
    pub user_id: String,
    pub name: Option<String>,
}

impl ReportUserParams {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.username)
    }

    /// Upper-cased first character of the display name, for the avatar.
    pub fn initial(&self) -> String {
        self.display_name()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

/// Trimmed report description, or [`RelayErr::EmptyReportDescription`].
pub fn validate_description(description: &str) -> Result<&str> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(RelayErr::EmptyReportDescription);
    }
    Ok(trimmed)
}

pub async fn submit_report(
    services: &dyn RoomServices,
    params: &ReportUserParams,
    description: &str,
) -> Result<()> {
    let description = validate_description(description)?;
    services.report_user(&params.user_id, description).await?;
    tracing::info!(
        user_id = %params.user_id,
        room_id = %params.room_id,
        "user reported"
    );
    Ok(())
}

use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::error;

/// Selections remembered between runs. A cleared selection is dropped from
/// the file rather than stored as `null`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Preferences {
    #[serde(
        default,
        rename = "lastAttendanceCenter",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_attendance_center: Option<String>,
    #[serde(
        default,
        rename = "lastSelectedWeek",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_selected_week: Option<String>,
}

pub async fn load_preferences(path: &Path) -> Preferences {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(preferences) => preferences,
            Err(err) => {
                error!("failed to parse preferences file: {err}");
                Preferences::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Preferences::default(),
        Err(err) => {
            error!("failed to read preferences file: {err}");
            Preferences::default()
        }
    }
}

pub async fn persist_preferences(path: &Path, preferences: &Preferences) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(preferences).map_err(AppError::preferences)?;
    fs::write(path, payload).await.map_err(AppError::preferences)?;
    Ok(())
}

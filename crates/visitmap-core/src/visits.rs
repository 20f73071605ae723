use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A sales representative's stop at a store within a time window.
///
/// `location` is either a literal `"latitude,longitude"` pair or a
/// human-readable address; the route resolver decides which.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: i64,
    pub username: String,
    #[serde(default, alias = "displayName")]
    pub display_name: Option<String>,
    #[serde(alias = "storeName")]
    pub store_name: String,
    pub location: String,
    #[serde(alias = "startTime")]
    pub start_time: DateTime<Utc>,
    /// `None` while the visit is still ongoing.
    #[serde(default, alias = "endTime")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "orderId")]
    pub order_id: Option<i64>,
}

impl Visit {
    /// Display name when present, otherwise the username.
    #[must_use]
    pub fn owner_label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.username)
    }

    #[must_use]
    pub fn is_ongoing(&self) -> bool {
        self.end_time.is_none()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VisitsDocument {
    List(Vec<Visit>),
    Wrapped { visits: Vec<Visit> },
}

/// Load and validate an ordered visit list from a JSON or YAML file.
///
/// Files ending in `.yaml` / `.yml` are parsed as YAML, everything else as
/// JSON. Both a bare array and a `{ visits: [...] }` wrapper are accepted.
/// File order is preserved; it is the route order.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_visits(path: &Path) -> Result<Vec<Visit>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::VisitsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let parse_err = |reason: String| ConfigError::VisitsFileParse {
        path: path.display().to_string(),
        reason,
    };

    let document: VisitsDocument = if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| parse_err(e.to_string()))?
    } else {
        serde_json::from_str(&content).map_err(|e| parse_err(e.to_string()))?
    };

    let visits = match document {
        VisitsDocument::List(visits) | VisitsDocument::Wrapped { visits } => visits,
    };

    validate_visits(&visits)?;
    Ok(visits)
}

/// Reject visit lists that cannot describe a single route.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] on duplicate ids, blank locations, or
/// an end time earlier than the start time.
pub fn validate_visits(visits: &[Visit]) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for visit in visits {
        if !seen_ids.insert(visit.id) {
            return Err(ConfigError::Validation(format!(
                "duplicate visit id: {}",
                visit.id
            )));
        }

        if visit.location.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "visit {} has an empty location",
                visit.id
            )));
        }

        if let Some(end) = visit.end_time {
            if end < visit.start_time {
                return Err(ConfigError::Validation(format!(
                    "visit {} ends before it starts",
                    visit.id
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "visits_test.rs"]
mod tests;

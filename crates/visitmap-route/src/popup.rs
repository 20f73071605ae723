//! Marker popup content for a visit.

use chrono::{DateTime, Utc};
use serde::Serialize;
use visitmap_core::Visit;

pub const ONGOING_LABEL: &str = "Ongoing";

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Popup {
    pub store_name: String,
    pub owner: String,
    pub time_range: String,
    pub location: String,
    pub description: Option<String>,
    pub order_id: Option<i64>,
}

impl Popup {
    #[must_use]
    pub fn for_visit(visit: &Visit) -> Self {
        Self {
            store_name: visit.store_name.clone(),
            owner: visit.owner_label().to_string(),
            time_range: format_time_range(visit.start_time, visit.end_time),
            location: visit.location.clone(),
            description: visit
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            order_id: visit.order_id,
        }
    }

    /// Plain-text rendering, one field per line.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut lines = vec![
            self.store_name.clone(),
            format!("Sales: {}", self.owner),
            format!("Time: {}", self.time_range),
            format!("Location: {}", self.location),
        ];
        if let Some(order_id) = self.order_id {
            lines.push(format!("Order: #{order_id}"));
        }
        if let Some(description) = &self.description {
            lines.push(description.clone());
        }
        lines.join("\n")
    }
}

/// `"2025-03-04 09:00 - 10:30"`, with the end date spelled out when the
/// visit spans midnight, and `"Ongoing"` in place of a missing end.
#[must_use]
pub fn format_time_range(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> String {
    let start_text = start.format(DATE_TIME_FORMAT);
    let end_text = match end {
        None => ONGOING_LABEL.to_string(),
        Some(end) if end.date_naive() == start.date_naive() => {
            end.format(TIME_FORMAT).to_string()
        }
        Some(end) => end.format(DATE_TIME_FORMAT).to_string(),
    };
    format!("{start_text} - {end_text}")
}

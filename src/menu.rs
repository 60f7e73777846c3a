use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A single timed drill inside a menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingMenuItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub duration_in_seconds: u32,
}

/// An ordered list of drills run back to back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingMenu {
    pub id: String,
    pub title: String,
    pub description: String,
    pub items: Vec<TrainingMenuItem>,
}

impl TrainingMenu {
    pub fn total_duration(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.duration_in_seconds))
            .sum()
    }
}

pub fn new_menu_id() -> String {
    format!("menu_{}", Utc::now().timestamp_millis())
}

/// Items are often created in bursts within the same millisecond, so a
/// random suffix keeps their ids apart.
pub fn new_item_id() -> String {
    format!(
        "item_{}_{:04x}",
        Utc::now().timestamp_millis(),
        rand::random::<u16>()
    )
}

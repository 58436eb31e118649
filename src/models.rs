//! Data models for todocore.
//!
//! This module defines the core entity, [`TodoItem`], and its wire encoding.
//! Timestamps travel as epoch seconds and are second-resolution throughout;
//! identities are client-generated UUID strings.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client tag recorded in `last_updated_by` when none is configured.
pub const DEFAULT_CLIENT_ID: &str = "1";

/// Priority of a todo item.
///
/// The wire names (`low` / `basic` / `important`) differ from the variant
/// names; unknown values are rejected during decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Importance {
    #[serde(rename = "low")]
    Low,
    #[default]
    #[serde(rename = "basic")]
    Normal,
    #[serde(rename = "important")]
    High,
}

/// A user-defined category attached to an item.
///
/// The color is an explicit `#RRGGBB` hex string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCategory {
    pub id: Uuid,
    pub name: String,
    pub color: String,
}

impl ItemCategory {
    /// Create a new category with a fresh id
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: color.into(),
        }
    }
}

/// A single todo record.
///
/// Identity is immutable after creation and unique within any collection.
/// Optional fields are omitted from the wire encoding when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Opaque unique identifier, generated client-side
    pub id: String,
    /// Free-text body
    pub text: String,
    #[serde(default)]
    pub importance: Importance,
    /// Due date; no time-of-day semantics attach to it
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<DateTime<Utc>>,
    /// Completion flag
    pub done: bool,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub changed_at: DateTime<Utc>,
    /// Raw color override, `#RRGGBB`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Tag of the client that last edited this item
    #[serde(default = "default_last_updated_by")]
    pub last_updated_by: String,
    #[serde(
        rename = "category_info",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<ItemCategory>,
}

fn default_last_updated_by() -> String {
    DEFAULT_CLIENT_ID.to_string()
}

impl TodoItem {
    /// Create a new item with a fresh id and current timestamps
    pub fn new(text: impl Into<String>) -> Self {
        // timestamps are second-resolution on the wire
        let now = Utc::now().trunc_subsecs(0);
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            importance: Importance::default(),
            deadline: None,
            done: false,
            created_at: now,
            changed_at: now,
            color: None,
            last_updated_by: default_last_updated_by(),
            category: None,
        }
    }

    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline.trunc_subsecs(0));
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_category(mut self, category: ItemCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Record an edit by bumping the last-edit timestamp
    pub fn touch(&mut self) {
        self.changed_at = Utc::now().trunc_subsecs(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_new_item_defaults() {
        let item = TodoItem::new("Buy milk");

        assert!(!item.id.is_empty());
        assert_eq!(item.text, "Buy milk");
        assert_eq!(item.importance, Importance::Normal);
        assert!(item.deadline.is_none());
        assert!(!item.done);
        assert_eq!(item.created_at, item.changed_at);
        assert_eq!(item.last_updated_by, DEFAULT_CLIENT_ID);
        assert!(item.category.is_none());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = TodoItem::new("a");
        let b = TodoItem::new("b");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_wire_encoding_field_names() {
        let item = TodoItem {
            id: "42".to_string(),
            text: "Call home".to_string(),
            importance: Importance::High,
            deadline: Some(fixed_time(1_720_000_000)),
            done: false,
            created_at: fixed_time(1_710_000_000),
            changed_at: fixed_time(1_715_000_000),
            color: None,
            last_updated_by: "1".to_string(),
            category: None,
        };

        let value: serde_json::Value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["id"], "42");
        assert_eq!(value["importance"], "important");
        assert_eq!(value["deadline"], 1_720_000_000i64);
        assert_eq!(value["done"], false);
        assert_eq!(value["created_at"], 1_710_000_000i64);
        assert_eq!(value["changed_at"], 1_715_000_000i64);
        assert_eq!(value["last_updated_by"], "1");
        // absent optionals stay off the wire entirely
        assert!(value.get("color").is_none());
        assert!(value.get("category_info").is_none());
    }

    #[test]
    fn test_decode_full_payload() {
        let payload = r##"{
            "id": "abc",
            "text": "Water plants",
            "importance": "low",
            "deadline": 1720000000,
            "done": true,
            "created_at": 1710000000,
            "changed_at": 1715000000,
            "color": "#FF0000",
            "last_updated_by": "phone",
            "category_info": {
                "id": "6f2a1e9c-0d3b-4a5e-8f10-223344556677",
                "name": "Garden",
                "color": "#00FF00"
            }
        }"##;

        let item: TodoItem = serde_json::from_str(payload).unwrap();
        assert_eq!(item.id, "abc");
        assert_eq!(item.importance, Importance::Low);
        assert_eq!(item.deadline, Some(fixed_time(1_720_000_000)));
        assert!(item.done);
        assert_eq!(item.color.as_deref(), Some("#FF0000"));
        assert_eq!(item.last_updated_by, "phone");
        let category = item.category.unwrap();
        assert_eq!(category.name, "Garden");
        assert_eq!(category.color, "#00FF00");
    }

    #[test]
    fn test_decode_defaults_for_optional_fields() {
        let payload = r#"{
            "id": "abc",
            "text": "Water plants",
            "done": false,
            "created_at": 1710000000,
            "changed_at": 1715000000
        }"#;

        let item: TodoItem = serde_json::from_str(payload).unwrap();
        assert_eq!(item.importance, Importance::Normal);
        assert!(item.deadline.is_none());
        assert_eq!(item.last_updated_by, DEFAULT_CLIENT_ID);
    }

    #[test]
    fn test_decode_rejects_missing_required_field() {
        // no text
        let payload = r#"{
            "id": "abc",
            "done": false,
            "created_at": 1710000000,
            "changed_at": 1715000000
        }"#;
        assert!(serde_json::from_str::<TodoItem>(payload).is_err());
    }

    #[test]
    fn test_decode_rejects_unknown_importance() {
        let payload = r#"{
            "id": "abc",
            "text": "x",
            "importance": "urgent",
            "done": false,
            "created_at": 1710000000,
            "changed_at": 1715000000
        }"#;
        assert!(serde_json::from_str::<TodoItem>(payload).is_err());
    }

    #[test]
    fn test_roundtrip_preserves_fields() {
        let item = TodoItem::new("Ship the package")
            .with_importance(Importance::High)
            .with_deadline(fixed_time(1_725_000_000))
            .with_color("#123456")
            .with_category(ItemCategory::new("Errands", "#ABCDEF"));

        let encoded = serde_json::to_string(&item).unwrap();
        let decoded: TodoItem = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, item);
    }

    #[test]
    fn test_touch_bumps_changed_at() {
        let mut item = TodoItem::new("x");
        item.changed_at = fixed_time(0);
        item.touch();
        assert!(item.changed_at >= item.created_at);
    }
}

//! Dashboard rendering of audit events
//!
//! Pure functions that turn stored events into feed items. These operate
//! on the stored wire strings, not the typed enums, so historical rows
//! with retired type names still render (as `Other`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{AuditEvent, EventType};

/// Coarse activity category shown in the dashboard feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Auth,
    Data,
    Document,
    Briefing,
    Admin,
    System,
    Other,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Data => "data",
            Self::Document => "document",
            Self::Briefing => "briefing",
            Self::Admin => "admin",
            Self::System => "system",
            Self::Other => "other",
        }
    }
}

/// Map an event type's dot-prefix to a feed category
pub fn classify(event_type: &str) -> ActivityCategory {
    match event_type.split('.').next().unwrap_or("") {
        "auth" => ActivityCategory::Auth,
        "data" => ActivityCategory::Data,
        "doc" => ActivityCategory::Document,
        "comm" => ActivityCategory::Briefing,
        "admin" => ActivityCategory::Admin,
        "sys" => ActivityCategory::System,
        _ => ActivityCategory::Other,
    }
}

/// Feed title for an event
///
/// Known types use their fixed labels; anything else gets a title derived
/// from the type string itself.
pub fn title_for(event: &AuditEvent) -> String {
    match event.event_type.parse::<EventType>() {
        Ok(t) => t.label().to_string(),
        Err(_) => derive_title(&event.event_type),
    }
}

/// Feed description for an event
pub fn describe(event: &AuditEvent) -> String {
    if !event.description.is_empty() {
        return event.description.clone();
    }
    if !event.target_type.is_empty() {
        return format!("{}: {}", event.target_type, event.target_repr);
    }
    String::new()
}

fn derive_title(event_type: &str) -> String {
    event_type
        .split(['.', '_'])
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One row of the recent-activity feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityItem {
    pub id: Uuid,
    pub kind: ActivityCategory,
    pub title: String,
    pub description: String,
    pub user: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
}

impl ActivityItem {
    pub fn from_event(event: &AuditEvent) -> Self {
        Self {
            id: event.id,
            kind: classify(&event.event_type),
            title: title_for(event),
            description: describe(event),
            user: event.user_email.clone(),
            timestamp: event.timestamp,
            event_type: event.event_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::models::NewAuditEvent;

    fn stored(event_type: EventType) -> AuditEvent {
        NewAuditEvent::builder(event_type).build().into_event()
    }

    #[test]
    fn classify_known_prefixes() {
        assert_eq!(classify("auth.login"), ActivityCategory::Auth);
        assert_eq!(classify("data.export"), ActivityCategory::Data);
        assert_eq!(classify("doc.download"), ActivityCategory::Document);
        assert_eq!(classify("comm.briefing_sent"), ActivityCategory::Briefing);
        assert_eq!(classify("admin.user_create"), ActivityCategory::Admin);
        assert_eq!(classify("sys.backup"), ActivityCategory::System);
    }

    #[test]
    fn classify_unknown_falls_back_to_other() {
        assert_eq!(classify("unknown.thing"), ActivityCategory::Other);
        assert_eq!(classify(""), ActivityCategory::Other);
        assert_eq!(classify("nodot"), ActivityCategory::Other);
    }

    #[test]
    fn title_uses_known_label() {
        let event = stored(EventType::DocDownload);
        assert_eq!(title_for(&event), "Document Downloaded");
    }

    #[test]
    fn title_derives_for_unknown_type() {
        let mut event = stored(EventType::DocDownload);
        event.event_type = "billing.invoice_sent".to_string();
        assert_eq!(title_for(&event), "Billing Invoice Sent");
    }

    #[test]
    fn describe_prefers_description() {
        let mut event = stored(EventType::DataView);
        event.description = "Data Viewed: John Smith".to_string();
        event.target_type = "Client".to_string();
        event.target_repr = "John Smith".to_string();
        assert_eq!(describe(&event), "Data Viewed: John Smith");
    }

    #[test]
    fn describe_falls_back_to_target() {
        let mut event = stored(EventType::DataView);
        event.target_type = "Client".to_string();
        event.target_repr = "John Smith".to_string();
        assert_eq!(describe(&event), "Client: John Smith");
    }

    #[test]
    fn describe_empty_when_nothing_known() {
        let event = stored(EventType::SysBackup);
        assert_eq!(describe(&event), "");
    }

    #[test]
    fn item_assembles_all_fields() {
        let mut event = stored(EventType::CommBriefingSent);
        event.user_email = "adviser@example.com".to_string();
        event.description = "Quarterly briefing sent".to_string();

        let item = ActivityItem::from_event(&event);
        assert_eq!(item.kind, ActivityCategory::Briefing);
        assert_eq!(item.title, "Briefing Sent");
        assert_eq!(item.user, "adviser@example.com");
        assert_eq!(item.event_type, "comm.briefing_sent");
    }

    #[test]
    fn category_serializes_lowercase() {
        let json = serde_json::to_string(&ActivityCategory::Document).unwrap();
        assert_eq!(json, r#""document""#);
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::Date;

use crate::ids::*;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Vendor,
    Client,
    Admin,
    #[serde(alias = "super_admin")]
    SuperAdmin,
}

impl Role {
    pub const ALL: [Self; 4] = [Self::Vendor, Self::Client, Self::Admin, Self::SuperAdmin];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vendor => "vendor",
            Self::Client => "client",
            Self::Admin => "admin",
            Self::SuperAdmin => "superadmin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "vendor" => Some(Self::Vendor),
            "client" => Some(Self::Client),
            "admin" => Some(Self::Admin),
            "superadmin" | "super_admin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

/// One list view per server resource. The resource code doubles as the
/// permission resource name and the list endpoint segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Events,
    Vendors,
    Submissions,
    Evaluations,
    Payments,
    Users,
    Roles,
    Menus,
}

impl ResourceKind {
    pub const ALL: [Self; 8] = [
        Self::Events,
        Self::Vendors,
        Self::Submissions,
        Self::Evaluations,
        Self::Payments,
        Self::Users,
        Self::Roles,
        Self::Menus,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Vendors => "vendors",
            Self::Submissions => "submissions",
            Self::Evaluations => "evaluations",
            Self::Payments => "payments",
            Self::Users => "users",
            Self::Roles => "roles",
            Self::Menus => "menus",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value.trim())
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Vendors => "vendors",
            Self::Submissions => "pitches",
            Self::Evaluations => "evaluations",
            Self::Payments => "payments",
            Self::Users => "users",
            Self::Roles => "roles",
            Self::Menus => "menus",
        }
    }

    /// Maps a menu route such as `/events` or `/admin/roles/` to its view.
    pub fn from_route(path: &str) -> Option<Self> {
        path.trim_matches('/')
            .rsplit('/')
            .next()
            .and_then(Self::parse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Open,
    Closed,
}

impl EventStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Shortlisted,
    Winner,
    Rejected,
}

impl SubmissionStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Shortlisted => "shortlisted",
            Self::Winner => "winner",
            Self::Rejected => "rejected",
        }
    }

    pub const fn is_final(self) -> bool {
        matches!(self, Self::Winner | Self::Rejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(with = "iso_date")]
    pub starts_on: Date,
    #[serde(default, with = "iso_date::option")]
    pub ends_on: Option<Date>,
    pub status: EventStatus,
    #[serde(default)]
    pub submission_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: VendorId,
    pub company_name: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub event_id: EventId,
    #[serde(default)]
    pub event_title: String,
    pub vendor_id: VendorId,
    #[serde(default)]
    pub vendor_name: String,
    pub pitch_title: String,
    pub status: SubmissionStatus,
    #[serde(with = "iso_date")]
    pub submitted_on: Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    pub submission_id: SubmissionId,
    #[serde(default)]
    pub pitch_title: String,
    #[serde(default)]
    pub evaluator_name: String,
    pub score: u8,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    #[serde(default)]
    pub vendor_name: String,
    #[serde(default)]
    pub event_title: String,
    pub amount_cents: i64,
    pub status: PaymentStatus,
    #[serde(default, with = "iso_date::option")]
    pub paid_on: Option<Date>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: RoleId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permission_count: i64,
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingKey {
    UiSidebarCollapsed,
    AuthLastEmail,
}

impl SettingKey {
    pub const ALL: [Self; 2] = [Self::UiSidebarCollapsed, Self::AuthLastEmail];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UiSidebarCollapsed => "ui.sidebar_collapsed",
            Self::AuthLastEmail => "auth.last_email",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ui.sidebar_collapsed" => Some(Self::UiSidebarCollapsed),
            "auth.last_email" => Some(Self::AuthLastEmail),
            _ => None,
        }
    }

    pub const fn expected_value_kind(self) -> SettingValueKind {
        match self {
            Self::UiSidebarCollapsed => SettingValueKind::Bool,
            Self::AuthLastEmail => SettingValueKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingValueKind {
    Bool,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingValue {
    Bool(bool),
    Text(String),
}

impl SettingValue {
    pub fn parse_for_key(key: SettingKey, raw: &str) -> Option<Self> {
        match key.expected_value_kind() {
            SettingValueKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => Some(Self::Bool(true)),
                "0" | "false" | "off" | "no" => Some(Self::Bool(false)),
                _ => None,
            },
            SettingValueKind::Text => Some(Self::Text(raw.to_owned())),
        }
    }

    pub fn to_storage(&self, key: SettingKey) -> Option<String> {
        match (key.expected_value_kind(), self) {
            (SettingValueKind::Bool, Self::Bool(value)) => {
                Some(if *value { "true" } else { "false" }.to_owned())
            }
            (SettingValueKind::Text, Self::Text(value)) => Some(value.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Event, EventStatus, ResourceKind, Role, SettingKey, SettingValue};
    use time::{Date, Month};

    #[test]
    fn role_parse_accepts_both_superadmin_spellings() {
        assert_eq!(Role::parse("superadmin"), Some(Role::SuperAdmin));
        assert_eq!(Role::parse("Super_Admin"), Some(Role::SuperAdmin));
        assert_eq!(Role::parse("guest"), None);
    }

    #[test]
    fn resource_kind_resolves_nested_routes() {
        assert_eq!(ResourceKind::from_route("/events"), Some(ResourceKind::Events));
        assert_eq!(
            ResourceKind::from_route("/admin/roles/"),
            Some(ResourceKind::Roles)
        );
        assert_eq!(ResourceKind::from_route("/dashboard"), None);
    }

    #[test]
    fn event_decodes_iso_dates() {
        let event: Event = serde_json::from_str(
            r#"{"id":4,"title":"Expo","starts_on":"2026-03-14","status":"open"}"#,
        )
        .expect("decode event");
        assert_eq!(
            event.starts_on,
            Date::from_calendar_date(2026, Month::March, 14).expect("valid date")
        );
        assert_eq!(event.ends_on, None);
        assert_eq!(event.status, EventStatus::Open);
        assert_eq!(event.submission_count, 0);
    }

    #[test]
    fn bool_setting_parse_and_storage_round_trip() {
        let parsed = SettingValue::parse_for_key(SettingKey::UiSidebarCollapsed, "on")
            .expect("parse bool setting");
        assert_eq!(parsed, SettingValue::Bool(true));
        assert_eq!(
            parsed.to_storage(SettingKey::UiSidebarCollapsed),
            Some("true".to_owned())
        );
    }

    #[test]
    fn mismatched_setting_value_type_rejected() {
        let text = SettingValue::Text("yes".to_owned());
        assert!(text.to_storage(SettingKey::UiSidebarCollapsed).is_none());
    }
}

//! Audit data models
//!
//! The event taxonomy is closed: wire names are validated at construction
//! time and unknown names are rejected. Stored rows keep the wire string so
//! reads stay tolerant of historical values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::error::AuditError;

// ============================================================================
// Audit Constants
// ============================================================================

/// Default number of audit events returned per query
pub const DEFAULT_QUERY_LIMIT: i64 = 100;

/// Maximum number of audit events a single query may return.
/// Bounds memory usage and keeps export payloads capped.
pub const MAX_QUERY_LIMIT: i64 = 1000;

/// Maximum rows returned by a bulk export
pub const EXPORT_MAX_ROWS: i64 = 1000;

/// User-agent strings are truncated to this many characters before storage
pub const USER_AGENT_MAX_LEN: usize = 500;

/// Target display strings are truncated to this many characters
pub const TARGET_REPR_MAX_LEN: usize = 255;

// ============================================================================
// Event Taxonomy
// ============================================================================

/// Closed taxonomy of audit event types
///
/// The prefix before the dot determines the coarse activity category used
/// by the dashboard feed (`auth.*`, `data.*`, `doc.*`, `comm.*`, `admin.*`,
/// `sys.*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    // Authentication
    #[serde(rename = "auth.login")]
    AuthLogin,
    #[serde(rename = "auth.logout")]
    AuthLogout,
    #[serde(rename = "auth.login_failed")]
    AuthLoginFailed,
    #[serde(rename = "auth.mfa_challenge")]
    AuthMfaChallenge,
    #[serde(rename = "auth.password_change")]
    AuthPasswordChange,
    #[serde(rename = "auth.password_reset")]
    AuthPasswordReset,

    // Data access
    #[serde(rename = "data.view")]
    DataView,
    #[serde(rename = "data.download")]
    DataDownload,
    #[serde(rename = "data.export")]
    DataExport,

    // Data modification
    #[serde(rename = "data.create")]
    DataCreate,
    #[serde(rename = "data.update")]
    DataUpdate,
    #[serde(rename = "data.delete")]
    DataDelete,

    // Documents
    #[serde(rename = "doc.upload")]
    DocUpload,
    #[serde(rename = "doc.view")]
    DocView,
    #[serde(rename = "doc.download")]
    DocDownload,
    #[serde(rename = "doc.share")]
    DocShare,
    #[serde(rename = "doc.delete")]
    DocDelete,

    // Client communications
    #[serde(rename = "comm.briefing_sent")]
    CommBriefingSent,
    #[serde(rename = "comm.meeting_pack")]
    CommMeetingPack,
    #[serde(rename = "comm.report_sent")]
    CommReportSent,

    // Administrative
    #[serde(rename = "admin.user_create")]
    AdminUserCreate,
    #[serde(rename = "admin.user_update")]
    AdminUserUpdate,
    #[serde(rename = "admin.user_deactivate")]
    AdminUserDeactivate,
    #[serde(rename = "admin.permission_change")]
    AdminPermissionChange,
    #[serde(rename = "admin.settings_change")]
    AdminSettingsChange,

    // System
    #[serde(rename = "sys.integration_sync")]
    SysIntegrationSync,
    #[serde(rename = "sys.integration_error")]
    SysIntegrationError,
    #[serde(rename = "sys.backup")]
    SysBackup,
    #[serde(rename = "sys.error")]
    SysError,
}

impl EventType {
    /// All known event types, in taxonomy order
    pub const ALL: [EventType; 29] = [
        Self::AuthLogin,
        Self::AuthLogout,
        Self::AuthLoginFailed,
        Self::AuthMfaChallenge,
        Self::AuthPasswordChange,
        Self::AuthPasswordReset,
        Self::DataView,
        Self::DataDownload,
        Self::DataExport,
        Self::DataCreate,
        Self::DataUpdate,
        Self::DataDelete,
        Self::DocUpload,
        Self::DocView,
        Self::DocDownload,
        Self::DocShare,
        Self::DocDelete,
        Self::CommBriefingSent,
        Self::CommMeetingPack,
        Self::CommReportSent,
        Self::AdminUserCreate,
        Self::AdminUserUpdate,
        Self::AdminUserDeactivate,
        Self::AdminPermissionChange,
        Self::AdminSettingsChange,
        Self::SysIntegrationSync,
        Self::SysIntegrationError,
        Self::SysBackup,
        Self::SysError,
    ];

    /// Wire name, e.g. `auth.login`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthLogin => "auth.login",
            Self::AuthLogout => "auth.logout",
            Self::AuthLoginFailed => "auth.login_failed",
            Self::AuthMfaChallenge => "auth.mfa_challenge",
            Self::AuthPasswordChange => "auth.password_change",
            Self::AuthPasswordReset => "auth.password_reset",
            Self::DataView => "data.view",
            Self::DataDownload => "data.download",
            Self::DataExport => "data.export",
            Self::DataCreate => "data.create",
            Self::DataUpdate => "data.update",
            Self::DataDelete => "data.delete",
            Self::DocUpload => "doc.upload",
            Self::DocView => "doc.view",
            Self::DocDownload => "doc.download",
            Self::DocShare => "doc.share",
            Self::DocDelete => "doc.delete",
            Self::CommBriefingSent => "comm.briefing_sent",
            Self::CommMeetingPack => "comm.meeting_pack",
            Self::CommReportSent => "comm.report_sent",
            Self::AdminUserCreate => "admin.user_create",
            Self::AdminUserUpdate => "admin.user_update",
            Self::AdminUserDeactivate => "admin.user_deactivate",
            Self::AdminPermissionChange => "admin.permission_change",
            Self::AdminSettingsChange => "admin.settings_change",
            Self::SysIntegrationSync => "sys.integration_sync",
            Self::SysIntegrationError => "sys.integration_error",
            Self::SysBackup => "sys.backup",
            Self::SysError => "sys.error",
        }
    }

    /// Human-readable display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::AuthLogin => "User Login",
            Self::AuthLogout => "User Logout",
            Self::AuthLoginFailed => "Login Failed",
            Self::AuthMfaChallenge => "MFA Challenge",
            Self::AuthPasswordChange => "Password Change",
            Self::AuthPasswordReset => "Password Reset",
            Self::DataView => "Data Viewed",
            Self::DataDownload => "Data Downloaded",
            Self::DataExport => "Data Exported",
            Self::DataCreate => "Data Created",
            Self::DataUpdate => "Data Updated",
            Self::DataDelete => "Data Deleted",
            Self::DocUpload => "Document Uploaded",
            Self::DocView => "Document Viewed",
            Self::DocDownload => "Document Downloaded",
            Self::DocShare => "Document Shared",
            Self::DocDelete => "Document Deleted",
            Self::CommBriefingSent => "Briefing Sent",
            Self::CommMeetingPack => "Meeting Pack Generated",
            Self::CommReportSent => "Report Sent",
            Self::AdminUserCreate => "User Created",
            Self::AdminUserUpdate => "User Updated",
            Self::AdminUserDeactivate => "User Deactivated",
            Self::AdminPermissionChange => "Permission Changed",
            Self::AdminSettingsChange => "Settings Changed",
            Self::SysIntegrationSync => "Integration Sync",
            Self::SysIntegrationError => "Integration Error",
            Self::SysBackup => "System Backup",
            Self::SysError => "System Error",
        }
    }
}

impl std::str::FromStr for EventType {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| AuditError::validation(format!("Unknown event type '{}'", s)))
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            "critical" => Ok(Self::Critical),
            other => Err(AuditError::validation(format!("Unknown severity '{}'", other))),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Actors and Targets
// ============================================================================

/// The acting user, as reported by the authentication collaborator
///
/// The email is snapshotted onto every event so identity survives later
/// account deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub email: String,
}

impl Actor {
    pub fn new(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

/// Capability every auditable business entity exposes
///
/// Targets span many unrelated entity kinds (clients, documents, users),
/// so events store a denormalized reference instead of a foreign key.
pub trait AuditTarget {
    /// Stable type name, e.g. `Client` or `Document`
    fn target_type(&self) -> &'static str;

    /// Stable identifier rendered as a string
    fn target_id(&self) -> String;

    /// Short human-readable label, e.g. a client's display name
    fn target_repr(&self) -> String;
}

/// Denormalized target reference stored on an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRef {
    pub target_type: String,
    pub target_id: String,
    pub target_repr: String,
}

impl TargetRef {
    /// Capture all three fields from a target in one step
    pub fn of(target: &dyn AuditTarget) -> Self {
        let repr: String = target.target_repr().chars().take(TARGET_REPR_MAX_LEN).collect();
        Self {
            target_type: target.target_type().to_string(),
            target_id: target.target_id(),
            target_repr: repr,
        }
    }
}

// ============================================================================
// Events
// ============================================================================

/// A persisted audit event
///
/// `event_type` and `severity` are stored as their wire strings; writes go
/// through the typed enums, reads tolerate whatever history holds.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub severity: String,
    pub user_id: Option<Uuid>,
    pub user_email: String,
    pub target_type: String,
    pub target_id: String,
    pub target_repr: String,
    pub client_id: Option<Uuid>,
    pub household_id: Option<Uuid>,
    pub description: String,
    pub data: JsonValue,
    pub old_values: JsonValue,
    pub new_values: JsonValue,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub request_id: String,
}

/// Input for appending an audit event
///
/// The id and timestamp are fixed at build time; the store persists them
/// as-is, which is what makes a duplicate-id append detectable.
#[derive(Debug, Clone)]
pub struct NewAuditEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    pub severity: Severity,
    pub user_id: Option<Uuid>,
    pub user_email: String,
    pub target: Option<TargetRef>,
    pub client_id: Option<Uuid>,
    pub household_id: Option<Uuid>,
    pub description: String,
    pub data: JsonValue,
    pub old_values: JsonValue,
    pub new_values: JsonValue,
    pub ip_address: Option<String>,
    pub user_agent: String,
    pub request_id: String,
}

impl NewAuditEvent {
    /// Start building an event of the given type
    pub fn builder(event_type: EventType) -> AuditEventBuilder {
        AuditEventBuilder::new(event_type)
    }

    /// Render as the persisted row shape
    pub fn into_event(self) -> AuditEvent {
        let (target_type, target_id, target_repr) = match self.target {
            Some(t) => (t.target_type, t.target_id, t.target_repr),
            None => (String::new(), String::new(), String::new()),
        };

        AuditEvent {
            id: self.id,
            timestamp: self.timestamp,
            event_type: self.event_type.as_str().to_string(),
            severity: self.severity.as_str().to_string(),
            user_id: self.user_id,
            user_email: self.user_email,
            target_type,
            target_id,
            target_repr,
            client_id: self.client_id,
            household_id: self.household_id,
            description: self.description,
            data: self.data,
            old_values: self.old_values,
            new_values: self.new_values,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            request_id: self.request_id,
        }
    }
}

/// Builder for audit events
///
/// A fresh v4 id is generated per event; ids are never reused, which is
/// what keeps concurrent writers from racing on the same identifier.
#[derive(Debug, Clone)]
pub struct AuditEventBuilder {
    event: NewAuditEvent,
}

impl AuditEventBuilder {
    fn new(event_type: EventType) -> Self {
        Self {
            event: NewAuditEvent {
                id: Uuid::new_v4(),
                timestamp: Utc::now(),
                event_type,
                severity: Severity::Info,
                user_id: None,
                user_email: String::new(),
                target: None,
                client_id: None,
                household_id: None,
                description: String::new(),
                data: JsonValue::Object(Default::default()),
                old_values: JsonValue::Object(Default::default()),
                new_values: JsonValue::Object(Default::default()),
                ip_address: None,
                user_agent: String::new(),
                request_id: String::new(),
            },
        }
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.event.severity = severity;
        self
    }

    /// Record the acting user; snapshots their email unless one was set
    pub fn actor(mut self, actor: &Actor) -> Self {
        self.event.user_id = Some(actor.id);
        if self.event.user_email.is_empty() {
            self.event.user_email = actor.email.clone();
        }
        self
    }

    pub fn user_email(mut self, email: impl Into<String>) -> Self {
        self.event.user_email = email.into();
        self
    }

    /// Record the affected entity; populates all three target fields
    pub fn target(mut self, target: &dyn AuditTarget) -> Self {
        self.event.target = Some(TargetRef::of(target));
        self
    }

    pub fn client_id(mut self, client_id: Option<Uuid>) -> Self {
        self.event.client_id = client_id;
        self
    }

    pub fn household_id(mut self, household_id: Option<Uuid>) -> Self {
        self.event.household_id = household_id;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.event.description = description.into();
        self
    }

    pub fn data(mut self, data: JsonValue) -> Self {
        self.event.data = data;
        self
    }

    pub fn old_values(mut self, old_values: JsonValue) -> Self {
        self.event.old_values = old_values;
        self
    }

    pub fn new_values(mut self, new_values: JsonValue) -> Self {
        self.event.new_values = new_values;
        self
    }

    pub fn ip_address(mut self, ip_address: Option<String>) -> Self {
        self.event.ip_address = ip_address;
        self
    }

    /// Set the user agent, truncated to [`USER_AGENT_MAX_LEN`] characters
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        let ua: String = user_agent.into();
        self.event.user_agent = ua.chars().take(USER_AGENT_MAX_LEN).collect();
        self
    }

    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.event.request_id = request_id.into();
        self
    }

    pub fn build(self) -> NewAuditEvent {
        self.event
    }
}

// ============================================================================
// Filters
// ============================================================================

/// Filter parameters for querying audit events
///
/// Typed fields are bound as their wire strings; results are ordered
/// timestamp descending with id as tie-break.
#[derive(Debug, Clone)]
pub struct EventFilter {
    pub event_type: Option<EventType>,
    pub severity: Option<Severity>,
    pub user_id: Option<Uuid>,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    pub client_id: Option<Uuid>,
    pub household_id: Option<Uuid>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            event_type: None,
            severity: None,
            user_id: None,
            target_type: None,
            target_id: None,
            client_id: None,
            household_id: None,
            start_time: None,
            end_time: None,
            limit: DEFAULT_QUERY_LIMIT,
            offset: 0,
        }
    }
}

impl EventFilter {
    /// The limit actually applied, clamped to [`MAX_QUERY_LIMIT`]
    pub fn effective_limit(&self) -> i64 {
        self.limit.clamp(1, MAX_QUERY_LIMIT)
    }
}

// ============================================================================
// Meta-audit
// ============================================================================

/// Kind of audit read being meta-audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Search,
    Export,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Export => "export",
        }
    }
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted meta-audit row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditQueryLog {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub user_email: String,
    pub query_type: String,
    pub query_params: JsonValue,
    pub result_count: i64,
    pub ip_address: Option<String>,
}

/// Input for recording a meta-audit row
#[derive(Debug, Clone)]
pub struct NewQueryLog {
    pub user_id: Option<Uuid>,
    pub user_email: String,
    pub query_type: QueryKind,
    pub query_params: JsonValue,
    pub result_count: i64,
    pub ip_address: Option<String>,
}

impl NewQueryLog {
    pub fn into_row(self) -> AuditQueryLog {
        AuditQueryLog {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            user_id: self.user_id,
            user_email: self.user_email,
            query_type: self.query_type.as_str().to_string(),
            query_params: self.query_params,
            result_count: self.result_count,
            ip_address: self.ip_address,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FakeClient {
        id: Uuid,
        name: String,
    }

    impl AuditTarget for FakeClient {
        fn target_type(&self) -> &'static str {
            "Client"
        }

        fn target_id(&self) -> String {
            self.id.to_string()
        }

        fn target_repr(&self) -> String {
            self.name.clone()
        }
    }

    #[test]
    fn event_type_wire_names_round_trip() {
        for t in EventType::ALL {
            assert_eq!(t.as_str().parse::<EventType>().unwrap(), t);
        }
    }

    #[test]
    fn event_type_rejects_unknown() {
        let err = "auth.teleport".parse::<EventType>().unwrap_err();
        assert!(matches!(err, AuditError::Validation(_)));
    }

    #[test]
    fn event_type_serde_uses_wire_names() {
        let json = serde_json::to_string(&EventType::DocDownload).unwrap();
        assert_eq!(json, r#""doc.download""#);
        let parsed: EventType = serde_json::from_str(r#""auth.login_failed""#).unwrap();
        assert_eq!(parsed, EventType::AuthLoginFailed);
    }

    #[test]
    fn severity_defaults_to_info() {
        assert_eq!(Severity::default(), Severity::Info);
        assert_eq!("warning".parse::<Severity>().unwrap(), Severity::Warning);
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn builder_captures_target_trio() {
        let client = FakeClient {
            id: Uuid::new_v4(),
            name: "John Smith".to_string(),
        };

        let event = NewAuditEvent::builder(EventType::DataView)
            .target(&client)
            .build();

        let target = event.target.unwrap();
        assert_eq!(target.target_type, "Client");
        assert_eq!(target.target_id, client.id.to_string());
        assert_eq!(target.target_repr, "John Smith");
    }

    #[test]
    fn target_repr_is_truncated() {
        let client = FakeClient {
            id: Uuid::new_v4(),
            name: "x".repeat(400),
        };

        let target = TargetRef::of(&client);
        assert_eq!(target.target_repr.chars().count(), TARGET_REPR_MAX_LEN);
    }

    #[test]
    fn builder_snapshots_actor_email() {
        let actor = Actor::new(Uuid::new_v4(), "adviser@example.com");
        let event = NewAuditEvent::builder(EventType::AuthLogin)
            .actor(&actor)
            .build();

        assert_eq!(event.user_id, Some(actor.id));
        assert_eq!(event.user_email, "adviser@example.com");
    }

    #[test]
    fn explicit_email_wins_over_snapshot() {
        let actor = Actor::new(Uuid::new_v4(), "adviser@example.com");
        let event = NewAuditEvent::builder(EventType::AuthLogin)
            .user_email("override@example.com")
            .actor(&actor)
            .build();

        assert_eq!(event.user_email, "override@example.com");
    }

    #[test]
    fn user_agent_is_truncated() {
        let event = NewAuditEvent::builder(EventType::AuthLogin)
            .user_agent("a".repeat(2000))
            .build();

        assert_eq!(event.user_agent.chars().count(), USER_AGENT_MAX_LEN);
    }

    #[test]
    fn builder_generates_fresh_ids() {
        let a = NewAuditEvent::builder(EventType::SysBackup).build();
        let b = NewAuditEvent::builder(EventType::SysBackup).build();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn into_event_renders_wire_strings() {
        let event = NewAuditEvent::builder(EventType::DataUpdate)
            .severity(Severity::Warning)
            .old_values(json!({"name": "A"}))
            .new_values(json!({"name": "B"}))
            .build()
            .into_event();

        assert_eq!(event.event_type, "data.update");
        assert_eq!(event.severity, "warning");
        assert_eq!(event.old_values, json!({"name": "A"}));
        assert_eq!(event.new_values, json!({"name": "B"}));
        assert!(event.target_type.is_empty());
        assert!(event.target_id.is_empty());
    }

    #[test]
    fn filter_limit_is_clamped() {
        let filter = EventFilter {
            limit: 50_000,
            ..Default::default()
        };
        assert_eq!(filter.effective_limit(), MAX_QUERY_LIMIT);

        let filter = EventFilter {
            limit: 0,
            ..Default::default()
        };
        assert_eq!(filter.effective_limit(), 1);
    }

    #[test]
    fn labels_exist_for_all_types() {
        for t in EventType::ALL {
            assert!(!t.label().is_empty());
        }
    }
}

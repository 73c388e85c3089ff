use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::status::map_status_to_tag;

/// Webhook payload posted by Jobber on job/visit/invoice lifecycle changes.
///
/// Every section is optional on the wire; missing sections decode to `None`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct JobberEvent {
    #[serde(default)]
    pub client: Option<ClientInfo>,
    #[serde(default)]
    pub job: Option<StatusSection>,
    #[serde(default)]
    pub visit: Option<StatusSection>,
    #[serde(default)]
    pub invoice: Option<StatusSection>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ClientInfo {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct StatusSection {
    /// Non-string values decode as `None` so they simply match no rule.
    #[serde(default, deserialize_with = "string_or_none")]
    pub status: Option<String>,
}

fn string_or_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Ok(Some(s)),
        _ => Ok(None),
    }
}

impl JobberEvent {
    /// Non-blank client email, trimmed.
    pub fn email(&self) -> Option<&str> {
        self.client
            .as_ref()
            .and_then(|c| c.email.as_deref())
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    pub fn first_name(&self) -> &str {
        self.client
            .as_ref()
            .and_then(|c| c.first_name.as_deref())
            .unwrap_or_default()
    }

    pub fn last_name(&self) -> &str {
        self.client
            .as_ref()
            .and_then(|c| c.last_name.as_deref())
            .unwrap_or_default()
    }

    pub fn job_status(&self) -> Option<&str> {
        section_status(&self.job)
    }

    pub fn visit_status(&self) -> Option<&str> {
        section_status(&self.visit)
    }

    pub fn invoice_status(&self) -> Option<&str> {
        section_status(&self.invoice)
    }

    /// Tag this event maps to, if any.
    pub fn tag(&self) -> Option<Tag> {
        map_status_to_tag(self.job_status(), self.visit_status(), self.invoice_status())
    }
}

fn section_status(section: &Option<StatusSection>) -> Option<&str> {
    section.as_ref().and_then(|s| s.status.as_deref())
}

/// Pipeline stage labels applied to CRM contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    NewRequest,
    QuoteSent,
    JobScheduled,
    TechnicianAssigned,
    JobInProgress,
    JobCompleted,
    PaymentCollected,
    JobClosed,
}

impl Tag {
    pub const ALL: [Tag; 8] = [
        Tag::NewRequest,
        Tag::QuoteSent,
        Tag::JobScheduled,
        Tag::TechnicianAssigned,
        Tag::JobInProgress,
        Tag::JobCompleted,
        Tag::PaymentCollected,
        Tag::JobClosed,
    ];

    /// Exact label string stored in the CRM.
    pub fn label(&self) -> &'static str {
        match self {
            Tag::NewRequest => "New Request / Lead In",
            Tag::QuoteSent => "Quote Sent",
            Tag::JobScheduled => "Job Scheduled",
            Tag::TechnicianAssigned => "Technician Assigned",
            Tag::JobInProgress => "Job In Progress",
            Tag::JobCompleted => "Job Completed",
            Tag::PaymentCollected => "Payment Collected",
            Tag::JobClosed => "Job Closed",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Tag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Contact record as returned by the CRM.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Fields used to create a contact that the CRM does not know yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl NewContact {
    /// `"first last"` with blank parts dropped.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

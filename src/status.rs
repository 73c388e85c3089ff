//! Jobber lifecycle status → CRM tag mapping.
//!
//! The rule table is evaluated top to bottom and the first hit wins. Row order
//! is observable behaviour: a job that is `assigned` with a `scheduled` visit is
//! tagged "Job Scheduled", not "Technician Assigned".

use crate::model::Tag;

/// Which part of the webhook payload a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSource {
    Job,
    Visit,
    Invoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRule {
    pub source: StatusSource,
    pub status: &'static str,
    pub tag: Tag,
}

const fn rule(source: StatusSource, status: &'static str, tag: Tag) -> StatusRule {
    StatusRule { source, status, tag }
}

pub const STATUS_RULES: [StatusRule; 8] = [
    rule(StatusSource::Job, "requires_action", Tag::NewRequest),
    rule(StatusSource::Job, "quote_sent", Tag::QuoteSent),
    rule(StatusSource::Visit, "scheduled", Tag::JobScheduled),
    rule(StatusSource::Job, "assigned", Tag::TechnicianAssigned),
    rule(StatusSource::Visit, "in_progress", Tag::JobInProgress),
    rule(StatusSource::Visit, "completed", Tag::JobCompleted),
    rule(StatusSource::Invoice, "paid", Tag::PaymentCollected),
    rule(StatusSource::Job, "closed", Tag::JobClosed),
];

/// Map the three lifecycle statuses to a tag. Unknown or absent values never match.
pub fn map_status_to_tag(
    job_status: Option<&str>,
    visit_status: Option<&str>,
    invoice_status: Option<&str>,
) -> Option<Tag> {
    STATUS_RULES
        .iter()
        .find(|r| {
            let value = match r.source {
                StatusSource::Job => job_status,
                StatusSource::Visit => visit_status,
                StatusSource::Invoice => invoice_status,
            };
            value == Some(r.status)
        })
        .map(|r| r.tag)
}

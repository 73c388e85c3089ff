use tracing::{info, instrument};

use crate::crm::CrmService;
use crate::error::SyncError;
use crate::model::{JobberEvent, NewContact, Tag};

/// Result of handling one webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No status rule matched; the CRM was not contacted.
    Skipped,
    Tagged {
        tag: Tag,
        contact_id: String,
        /// The contact did not exist and was created by this event.
        created: bool,
    },
}

/// Find or create the event's contact in the CRM and apply the mapped tag.
///
/// Calls run in order (lookup, optional create, tag) and the first failure
/// aborts the sync. A contact created before a failed tag call is left as is.
#[instrument(skip_all, fields(email = tracing::field::Empty))]
pub async fn sync_contact(
    crm: &dyn CrmService,
    event: &JobberEvent,
) -> Result<SyncOutcome, SyncError> {
    let email = event.email().ok_or(SyncError::MissingEmail)?;
    tracing::Span::current().record("email", email);

    let Some(tag) = event.tag() else {
        info!(
            job = ?event.job_status(),
            visit = ?event.visit_status(),
            invoice = ?event.invoice_status(),
            "no tag matched; skipping"
        );
        return Ok(SyncOutcome::Skipped);
    };

    let (contact, created) = match crm.find_contact_by_email(email).await? {
        Some(contact) => (contact, false),
        None => {
            let new_contact = NewContact {
                first_name: event.first_name().to_string(),
                last_name: event.last_name().to_string(),
                email: email.to_string(),
            };
            let contact = crm.create_contact(&new_contact).await?;
            info!(contact_id = %contact.id, "created contact");
            (contact, true)
        }
    };

    crm.add_tags(&contact.id, &[tag]).await?;
    info!(contact_id = %contact.id, %tag, created, "tag applied");

    Ok(SyncOutcome::Tagged {
        tag,
        contact_id: contact.id,
        created,
    })
}

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use jobber_ghl_sync::crm::CrmService;
use jobber_ghl_sync::error::CrmError;
use jobber_ghl_sync::model::{Contact, NewContact, Tag};
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrmCall {
    Lookup(String),
    Create(NewContact),
    AddTags(String, Vec<Tag>),
}

/// In-memory `CrmService` that records every call and replays queued responses.
#[derive(Clone, Default)]
pub struct RecordingCrm {
    calls: Arc<Mutex<Vec<CrmCall>>>,
    lookup_responses: Arc<Mutex<VecDeque<Result<Option<Contact>, CrmError>>>>,
    create_responses: Arc<Mutex<VecDeque<Result<Contact, CrmError>>>>,
    tag_responses: Arc<Mutex<VecDeque<Result<(), CrmError>>>>,
}

pub fn contact(id: &str, email: &str) -> Contact {
    Contact {
        id: id.into(),
        email: Some(email.into()),
        first_name: None,
        last_name: None,
    }
}

pub fn upstream_error(status: u16, body: &str) -> CrmError {
    CrmError::Status {
        status,
        body: body.into(),
    }
}

impl RecordingCrm {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_lookup(&self, response: Result<Option<Contact>, CrmError>) {
        self.lookup_responses.lock().await.push_back(response);
    }

    pub async fn push_create(&self, response: Result<Contact, CrmError>) {
        self.create_responses.lock().await.push_back(response);
    }

    pub async fn push_tag(&self, response: Result<(), CrmError>) {
        self.tag_responses.lock().await.push_back(response);
    }

    pub async fn calls(&self) -> Vec<CrmCall> {
        self.calls.lock().await.clone()
    }

    pub async fn count(&self, pred: fn(&CrmCall) -> bool) -> usize {
        self.calls.lock().await.iter().filter(|c| pred(c)).count()
    }

    pub async fn lookups(&self) -> usize {
        self.count(|c| matches!(c, CrmCall::Lookup(_))).await
    }

    pub async fn creates(&self) -> usize {
        self.count(|c| matches!(c, CrmCall::Create(_))).await
    }

    pub async fn tag_calls(&self) -> usize {
        self.count(|c| matches!(c, CrmCall::AddTags(..))).await
    }
}

#[async_trait::async_trait]
impl CrmService for RecordingCrm {
    async fn find_contact_by_email(&self, email: &str) -> Result<Option<Contact>, CrmError> {
        self.calls.lock().await.push(CrmCall::Lookup(email.to_string()));
        self.lookup_responses
            .lock()
            .await
            .pop_front()
            .unwrap_or(Ok(None))
    }

    async fn create_contact(&self, new_contact: &NewContact) -> Result<Contact, CrmError> {
        self.calls
            .lock()
            .await
            .push(CrmCall::Create(new_contact.clone()));
        self.create_responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(contact("created-id", &new_contact.email)))
    }

    async fn add_tags(&self, contact_id: &str, tags: &[Tag]) -> Result<(), CrmError> {
        self.calls
            .lock()
            .await
            .push(CrmCall::AddTags(contact_id.to_string(), tags.to_vec()));
        self.tag_responses.lock().await.pop_front().unwrap_or(Ok(()))
    }
}

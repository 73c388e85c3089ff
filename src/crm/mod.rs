use async_trait::async_trait;
use reqwest::{Client, Request, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Ghl;
use crate::crm::model::{CreateContactResp, LookupContactResp};
use crate::error::CrmError;
use crate::model::{Contact, NewContact, Tag};

pub mod model;

/// Contact operations the sync workflow needs from the CRM.
#[async_trait]
pub trait CrmService: Send + Sync {
    async fn find_contact_by_email(&self, email: &str) -> Result<Option<Contact>, CrmError>;

    async fn create_contact(&self, contact: &NewContact) -> Result<Contact, CrmError>;

    async fn add_tags(&self, contact_id: &str, tags: &[Tag]) -> Result<(), CrmError>;
}

/// GoHighLevel REST (v1) client.
#[derive(Clone)]
pub struct GhlClient {
    http: Client,
    base_url: Url,
    api_key: String,
    location_id: String,
}

impl fmt::Debug for GhlClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GhlClient")
            .field("base_url", &self.base_url)
            .field("location_id", &self.location_id)
            .finish_non_exhaustive()
    }
}

impl GhlClient {
    pub fn new(cfg: &Ghl) -> Result<Self, CrmError> {
        let base_url =
            Url::parse(&cfg.base_url).map_err(|e| CrmError::InvalidUrl(e.to_string()))?;
        Self::with_base_url(
            cfg.api_key.clone(),
            cfg.location_id.clone(),
            base_url,
            Duration::from_secs(cfg.timeout_secs),
        )
    }

    pub fn with_base_url(
        api_key: String,
        location_id: String,
        base_url: Url,
        timeout: Duration,
    ) -> Result<Self, CrmError> {
        if base_url.cannot_be_a_base() {
            return Err(CrmError::InvalidUrl(base_url.to_string()));
        }
        let http = Client::builder()
            .user_agent(concat!("jobber-ghl-sync/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .no_proxy()
            .build()?;
        Ok(Self {
            http,
            base_url,
            api_key,
            location_id,
        })
    }

    /// Base URL joined with `segments`; each segment is percent-encoded.
    /// A trailing `""` segment yields a trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CrmError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CrmError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
    }

    pub fn build_lookup_request(&self, email: &str) -> Result<Request, CrmError> {
        let endpoint = self.endpoint(&["contacts", "lookup"])?;
        Ok(self
            .authorized(self.http.get(endpoint))
            .query(&[("email", email)])
            .build()?)
    }

    pub fn build_create_request(&self, contact: &NewContact) -> Result<Request, CrmError> {
        let endpoint = self.endpoint(&["contacts", ""])?;
        let body = build_create_contact_body(contact, &self.location_id);
        Ok(self
            .authorized(self.http.post(endpoint))
            .json(&body)
            .build()?)
    }

    pub fn build_add_tags_request(&self, contact_id: &str, tags: &[Tag]) -> Result<Request, CrmError> {
        let endpoint = self.endpoint(&["contacts", contact_id, "tags", ""])?;
        let body = build_add_tags_body(tags);
        Ok(self
            .authorized(self.http.post(endpoint))
            .json(&body)
            .build()?)
    }

    async fn send(&self, request: Request) -> Result<Response, CrmError> {
        debug!(method=%request.method(), url=%request.url(), "sending GHL request");
        let res = self.http.execute(request).await?;
        debug!(status=%res.status(), "GHL response");
        Ok(res)
    }

    pub async fn find_contact_by_email(&self, email: &str) -> Result<Option<Contact>, CrmError> {
        let request = self.build_lookup_request(email)?;
        let res = self.send(request).await?;
        let body = read_success_body(res).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let payload: LookupContactResp = decode(&body)?;
        Ok(payload.into_contact())
    }

    pub async fn create_contact(&self, contact: &NewContact) -> Result<Contact, CrmError> {
        let request = self.build_create_request(contact)?;
        let res = self.send(request).await?;
        let body = read_success_body(res).await?;
        let payload: CreateContactResp = decode(&body)?;
        Ok(payload.contact)
    }

    pub async fn add_tags(&self, contact_id: &str, tags: &[Tag]) -> Result<(), CrmError> {
        let request = self.build_add_tags_request(contact_id, tags)?;
        let res = self.send(request).await?;
        read_success_body(res).await?;
        Ok(())
    }
}

#[async_trait]
impl CrmService for GhlClient {
    async fn find_contact_by_email(&self, email: &str) -> Result<Option<Contact>, CrmError> {
        GhlClient::find_contact_by_email(self, email).await
    }

    async fn create_contact(&self, contact: &NewContact) -> Result<Contact, CrmError> {
        GhlClient::create_contact(self, contact).await
    }

    async fn add_tags(&self, contact_id: &str, tags: &[Tag]) -> Result<(), CrmError> {
        GhlClient::add_tags(self, contact_id, tags).await
    }
}

/// Read the body of a 2xx response, or turn anything else into `CrmError::Status`.
async fn read_success_body(res: Response) -> Result<String, CrmError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.text().await?);
    }

    let body = match res.text().await {
        Ok(body) => body,
        Err(err) => {
            warn!(%status, ?err, "failed to read GHL error body");
            String::new()
        }
    };
    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!(%body, "rate limited by GHL");
    } else {
        warn!(%status, %body, "GHL API error");
    }
    Err(CrmError::Status {
        status: status.as_u16(),
        body,
    })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, CrmError> {
    serde_json::from_str(body).map_err(|e| CrmError::Decode(e.to_string()))
}

pub fn build_create_contact_body(contact: &NewContact, location_id: &str) -> Value {
    json!({
        "firstName": contact.first_name,
        "lastName": contact.last_name,
        "name": contact.full_name(),
        "email": contact.email,
        "locationId": location_id,
    })
}

pub fn build_add_tags_body(tags: &[Tag]) -> Value {
    let labels: Vec<&str> = tags.iter().map(Tag::label).collect();
    json!({ "tags": labels })
}

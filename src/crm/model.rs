use serde::Deserialize;

use crate::model::Contact;

/// Body of `GET contacts/lookup`.
///
/// GHL has answered with either a single `contact` or a `contacts` array
/// depending on API revision; both are accepted.
#[derive(Deserialize, Debug, Default)]
pub struct LookupContactResp {
    #[serde(default)]
    pub contact: Option<Contact>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

impl LookupContactResp {
    pub fn into_contact(self) -> Option<Contact> {
        self.contact.or_else(|| self.contacts.into_iter().next())
    }
}

/// Body of `POST contacts/`.
#[derive(Deserialize, Debug)]
pub struct CreateContactResp {
    pub contact: Contact,
}

//! Jobber → GoHighLevel contact sync.
//!
//! Receives Jobber lifecycle webhooks, maps job/visit/invoice statuses to a
//! pipeline tag and applies it to the matching GHL contact, creating the
//! contact first when it does not exist.

pub mod config;
pub mod crm;
pub mod error;
pub mod model;
pub mod server;
pub mod status;
pub mod sync;

//! SumUp REST API client
//!
//! Only the endpoints the CLI needs are modelled. Requests are blocking and
//! are expected to run off the UI thread when used from the picker.

mod client;
pub mod memberships;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use memberships::{
    ListMembershipsParams, ListMembershipsResponse, Membership, MembershipStatus, Resource,
    ResourceParent,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized ({status}): provide an API key with --api-key or SUMUP_API_KEY")]
    Unauthorized { status: u16 },

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unsupported status {0:?}")]
    UnsupportedStatus(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

//! Memberships of the authenticated user
//!
//! A membership links the user to a resource (merchant or organization) they
//! can act on behalf of.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::{ApiClient, ApiError, Result};

const MEMBERSHIPS_PATH: &str = "/v0.1/memberships";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Accepted,
    Pending,
    Expired,
    Disabled,
    #[serde(other)]
    Unknown,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Accepted => "accepted",
            MembershipStatus::Pending => "pending",
            MembershipStatus::Expired => "expired",
            MembershipStatus::Disabled => "disabled",
            MembershipStatus::Unknown => "unknown",
        }
    }

    /// Human readable label for tables
    pub fn label(&self) -> &'static str {
        match self {
            MembershipStatus::Accepted => "Accepted",
            MembershipStatus::Pending => "Pending",
            MembershipStatus::Expired => "Expired",
            MembershipStatus::Disabled => "Disabled",
            MembershipStatus::Unknown => "Unknown",
        }
    }
}

impl FromStr for MembershipStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "accepted" => Ok(MembershipStatus::Accepted),
            "pending" => Ok(MembershipStatus::Pending),
            "expired" => Ok(MembershipStatus::Expired),
            "disabled" => Ok(MembershipStatus::Disabled),
            "unknown" => Ok(MembershipStatus::Unknown),
            _ => Err(ApiError::UnsupportedStatus(s.to_string())),
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceParent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// The merchant or organization a membership grants access to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ResourceParent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub id: String,
    pub resource_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    pub resource: Resource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListMembershipsResponse {
    pub items: Vec<Membership>,
    #[serde(default)]
    pub total_count: u64,
}

/// Filters for `GET /v0.1/memberships`; unset fields are left out of the query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListMembershipsParams {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub kind: Option<String>,
    pub status: Option<MembershipStatus>,
    pub resource_type: Option<String>,
    pub resource_name: Option<String>,
    pub resource_attributes_sandbox: Option<bool>,
    pub resource_parent_id: Option<String>,
    pub resource_parent_type: Option<String>,
}

impl ListMembershipsParams {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(kind) = &self.kind {
            pairs.push(("kind", kind.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        if let Some(resource_type) = &self.resource_type {
            pairs.push(("resource.type", resource_type.clone()));
        }
        if let Some(name) = &self.resource_name {
            pairs.push(("resource.name", name.clone()));
        }
        if let Some(sandbox) = self.resource_attributes_sandbox {
            pairs.push(("resource.attributes.sandbox", sandbox.to_string()));
        }
        if let Some(parent_id) = &self.resource_parent_id {
            pairs.push(("resource.parent.id", parent_id.clone()));
        }
        if let Some(parent_type) = &self.resource_parent_type {
            pairs.push(("resource.parent.type", parent_type.clone()));
        }
        pairs
    }
}

impl ApiClient {
    pub fn list_memberships(
        &self,
        params: &ListMembershipsParams,
    ) -> Result<ListMembershipsResponse> {
        self.get_json(MEMBERSHIPS_PATH, &params.query_pairs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "items": [
            {
                "id": "mem_1",
                "resource_id": "MC1",
                "type": "merchant",
                "roles": ["role_admin"],
                "permissions": [],
                "status": "accepted",
                "created_at": "2024-03-01T10:00:00Z",
                "updated_at": "2024-03-02T10:00:00Z",
                "resource": {
                    "id": "MC1",
                    "type": "merchant",
                    "name": "Acme Shop",
                    "attributes": {"merchant_code": "MC1", "sandbox": false},
                    "parent": {"id": "org1", "type": "organization"}
                }
            },
            {
                "id": "mem_2",
                "resource_id": "org1",
                "type": "organization",
                "status": "suspended",
                "created_at": "2024-03-01T10:00:00Z",
                "updated_at": "2024-03-01T10:00:00Z",
                "resource": {"id": "org1", "type": "organization", "name": "Acme"}
            }
        ],
        "total_count": 2
    }"#;

    #[test]
    fn test_decode_list_response() {
        let response: ListMembershipsResponse = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(response.total_count, 2);

        let merchant = &response.items[0];
        assert_eq!(merchant.status, MembershipStatus::Accepted);
        assert_eq!(merchant.roles, vec!["role_admin".to_string()]);
        assert_eq!(merchant.resource.kind, "merchant");
        assert_eq!(
            merchant.resource.attributes.get("merchant_code"),
            Some(&Value::from("MC1"))
        );
        assert_eq!(
            merchant.resource.parent.as_ref().map(|p| p.id.as_str()),
            Some("org1")
        );

        // Statuses the client does not know about decode as Unknown
        let org = &response.items[1];
        assert_eq!(org.status, MembershipStatus::Unknown);
        assert!(org.roles.is_empty());
        assert!(org.resource.attributes.is_empty());
    }

    #[test]
    fn test_query_pairs_only_include_set_filters() {
        assert!(ListMembershipsParams::default().query_pairs().is_empty());

        let params = ListMembershipsParams {
            limit: Some(25),
            status: Some(MembershipStatus::Accepted),
            resource_name: Some("acme".to_string()),
            resource_attributes_sandbox: Some(true),
            resource_parent_id: Some("org1".to_string()),
            resource_parent_type: Some("organization".to_string()),
            ..Default::default()
        };
        assert_eq!(
            params.query_pairs(),
            vec![
                ("limit", "25".to_string()),
                ("status", "accepted".to_string()),
                ("resource.name", "acme".to_string()),
                ("resource.attributes.sandbox", "true".to_string()),
                ("resource.parent.id", "org1".to_string()),
                ("resource.parent.type", "organization".to_string()),
            ]
        );
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(
            "Accepted".parse::<MembershipStatus>().unwrap(),
            MembershipStatus::Accepted
        );
        assert_eq!(MembershipStatus::Disabled.label(), "Disabled");
        let err = "bogus".parse::<MembershipStatus>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported status \"bogus\"");
    }
}

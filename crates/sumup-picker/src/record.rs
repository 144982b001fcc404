//! Membership rows shown by the picker and the source they are fetched from

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Kind of resource a membership points at
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceType {
    /// Non-terminal node that can be drilled into
    Organization,
    /// Terminal, selectable resource
    Merchant,
    /// Anything the API adds later; treated like a merchant when selected
    Other(String),
}

impl ResourceType {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceType::Organization => "organization",
            ResourceType::Merchant => "merchant",
            ResourceType::Other(kind) => kind,
        }
    }

    pub fn is_organization(&self) -> bool {
        matches!(self, ResourceType::Organization)
    }
}

impl From<String> for ResourceType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "organization" => ResourceType::Organization,
            "merchant" => ResourceType::Merchant,
            _ => ResourceType::Other(value),
        }
    }
}

impl From<&str> for ResourceType {
    fn from(value: &str) -> Self {
        ResourceType::from(value.to_string())
    }
}

impl From<ResourceType> for String {
    fn from(value: ResourceType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row returned by an [`ItemSource`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub resource_id: String,
    pub resource_type: ResourceType,
    pub resource_name: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl MembershipRecord {
    pub fn new(
        resource_id: impl Into<String>,
        resource_type: ResourceType,
        resource_name: impl Into<String>,
    ) -> Self {
        Self {
            resource_id: resource_id.into(),
            resource_type,
            resource_name: resource_name.into(),
            attributes: Map::new(),
        }
    }

    pub fn organization(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, ResourceType::Organization, name)
    }

    pub fn merchant(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, ResourceType::Merchant, name)
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn is_organization(&self) -> bool {
        self.resource_type.is_organization()
    }

    /// Merchant code carried in the `merchant_code` attribute, if any
    pub fn merchant_code_attribute(&self) -> Option<&str> {
        self.attributes
            .get("merchant_code")
            .and_then(Value::as_str)
            .filter(|code| !code.is_empty())
    }

    /// Code to persist as the merchant context (attribute first, then the resource id)
    pub fn merchant_code(&self) -> &str {
        self.merchant_code_attribute().unwrap_or(&self.resource_id)
    }

    /// Parent descriptor used when drilling into this record
    pub fn as_parent(&self) -> ParentRef {
        ParentRef {
            id: self.resource_id.clone(),
            resource_type: self.resource_type.clone(),
            name: self.resource_name.clone(),
        }
    }
}

/// What a navigation level is "inside"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub id: String,
    pub resource_type: ResourceType,
    pub name: String,
}

/// Failure reported by an [`ItemSource`], kept as text so the engine can hold on to it
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<anyhow::Error> for FetchError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(format!("{err:#}"))
    }
}

/// Remote listing of memberships, filtered by name and parent
///
/// An empty or absent `query` means no name filter; an absent `parent` means
/// the root level (top-level organizations and directly owned merchants).
pub trait ItemSource: Send + 'static {
    fn fetch(
        &self,
        query: Option<&str>,
        parent: Option<&ParentRef>,
    ) -> Result<Vec<MembershipRecord>>;
}

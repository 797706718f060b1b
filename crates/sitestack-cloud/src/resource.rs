//! Resource descriptors, references and handles

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of cloud resource the sequencer can ensure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Bucket,
    Policy,
    User,
    Certificate,
    Distribution,
    DnsRecord,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Bucket => "bucket",
            ResourceKind::Policy => "policy",
            ResourceKind::User => "user",
            ResourceKind::Certificate => "certificate",
            ResourceKind::Distribution => "distribution",
            ResourceKind::DnsRecord => "dns-record",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an existence check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceState {
    /// Found by the provider lookup
    Exists,
    /// Not found by the provider lookup
    Absent,
    /// Created during this run
    Created,
}

impl std::fmt::Display for ResourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceState::Exists => write!(f, "exists"),
            ResourceState::Absent => write!(f, "absent"),
            ResourceState::Created => write!(f, "created"),
        }
    }
}

/// Reference to a resource by kind and natural key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub key: String,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.key)
    }
}

/// Named input a descriptor takes from another resource's handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Name under which the provider sees the resolved handle
    pub name: String,
    pub target: ResourceRef,
}

/// Declarative description of one resource to ensure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub kind: ResourceKind,

    /// Natural key used for the existence lookup
    pub key: String,

    /// Handles this resource needs at creation time
    #[serde(default)]
    pub dependencies: Vec<Dependency>,

    /// Kind-specific parameters
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
}

impl ResourceDescriptor {
    pub fn new(kind: ResourceKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
            dependencies: Vec::new(),
            config: serde_json::Map::new(),
        }
    }

    pub fn bucket(name: impl Into<String>) -> Self {
        Self::new(ResourceKind::Bucket, name)
    }

    pub fn policy(name: impl Into<String>) -> Self {
        Self::new(ResourceKind::Policy, name)
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self::new(ResourceKind::User, name)
    }

    pub fn certificate(domain: impl Into<String>) -> Self {
        Self::new(ResourceKind::Certificate, domain)
    }

    pub fn distribution(alias: impl Into<String>) -> Self {
        Self::new(ResourceKind::Distribution, alias)
    }

    pub fn dns_record(name: impl Into<String>) -> Self {
        Self::new(ResourceKind::DnsRecord, name)
    }

    /// Declare a dependency on another resource's handle
    pub fn depends_on(mut self, name: impl Into<String>, target: ResourceRef) -> Self {
        self.dependencies.push(Dependency {
            name: name.into(),
            target,
        });
        self
    }

    pub fn with_config(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    pub fn reference(&self) -> ResourceRef {
        ResourceRef::new(self.kind, self.key.clone())
    }

    /// Get a configuration value as a specific type
    pub fn get_config<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.config
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(|v| v.as_str())
    }
}

/// Attributes reported by a provider for an existing or new resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAttributes {
    /// Resolved identifier (ARN, distribution id, bucket name...)
    pub id: String,
    pub attributes: BTreeMap<String, String>,
}

impl ResourceAttributes {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Resolved identifier and attributes of a provisioned resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handle {
    pub kind: ResourceKind,
    pub key: String,
    pub id: String,
    pub attributes: BTreeMap<String, String>,
}

impl Handle {
    pub fn from_attributes(descriptor: &ResourceDescriptor, attrs: ResourceAttributes) -> Self {
        Self {
            kind: descriptor.kind,
            key: descriptor.key.clone(),
            id: attrs.id,
            attributes: attrs.attributes,
        }
    }

    pub fn reference(&self) -> ResourceRef {
        ResourceRef::new(self.kind, self.key.clone())
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

//! Provisioning context: handles resolved so far in one run

use crate::error::{CloudError, Result};
use crate::resource::{Handle, ResourceDescriptor, ResourceRef};
use std::collections::{BTreeMap, HashMap};

/// Accumulating map from resource reference to resolved handle
///
/// Owned by a single sequencer run and dropped when it ends.
#[derive(Debug, Default)]
pub struct ProvisioningContext {
    handles: HashMap<ResourceRef, Handle>,
}

impl ProvisioningContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handle: Handle) {
        self.handles.insert(handle.reference(), handle);
    }

    pub fn get(&self, reference: &ResourceRef) -> Option<&Handle> {
        self.handles.get(reference)
    }

    /// Collect the handles a descriptor depends on
    pub fn resolve_inputs(&self, descriptor: &ResourceDescriptor) -> Result<ResolvedInputs> {
        let mut handles = BTreeMap::new();

        for dependency in &descriptor.dependencies {
            let handle = self.get(&dependency.target).ok_or_else(|| {
                CloudError::DependencyUnavailable {
                    kind: descriptor.kind,
                    key: descriptor.key.clone(),
                    dependency: format!("{} ({})", dependency.name, dependency.target),
                }
            })?;
            handles.insert(dependency.name.clone(), handle.clone());
        }

        Ok(ResolvedInputs {
            owner: descriptor.reference(),
            handles,
        })
    }
}

/// Dependency handles passed to [`crate::CloudProvider::create`]
#[derive(Debug, Clone)]
pub struct ResolvedInputs {
    owner: ResourceRef,
    handles: BTreeMap<String, Handle>,
}

impl ResolvedInputs {
    pub fn get(&self, name: &str) -> Option<&Handle> {
        self.handles.get(name)
    }

    /// Get an input the provider cannot work without
    pub fn require(&self, name: &str) -> Result<&Handle> {
        self.get(name)
            .ok_or_else(|| CloudError::DependencyUnavailable {
                kind: self.owner.kind,
                key: self.owner.key.clone(),
                dependency: name.to_string(),
            })
    }

    /// Get a named attribute of a required input
    pub fn require_attribute(&self, name: &str, attribute: &str) -> Result<&str> {
        let handle = self.require(name)?;
        handle
            .attribute(attribute)
            .ok_or_else(|| CloudError::DependencyUnavailable {
                kind: self.owner.kind,
                key: self.owner.key.clone(),
                dependency: format!("{}.{} ({})", name, attribute, handle.reference()),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Handle)> {
        self.handles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ResourceAttributes, ResourceKind};

    fn bucket_handle(name: &str) -> Handle {
        Handle::from_attributes(
            &ResourceDescriptor::bucket(name),
            ResourceAttributes::new(name)
                .with_attribute("website_endpoint", format!("{}.s3-website", name)),
        )
    }

    #[test]
    fn test_resolve_inputs() {
        let mut ctx = ProvisioningContext::new();
        ctx.insert(bucket_handle("site-a"));

        let distribution = ResourceDescriptor::distribution("example.com")
            .depends_on("origin", ResourceRef::new(ResourceKind::Bucket, "site-a"));

        let inputs = ctx.resolve_inputs(&distribution).unwrap();
        assert_eq!(inputs.require("origin").unwrap().id, "site-a");
        assert_eq!(
            inputs.require_attribute("origin", "website_endpoint").unwrap(),
            "site-a.s3-website"
        );
    }

    #[test]
    fn test_missing_dependency() {
        let ctx = ProvisioningContext::new();
        let record = ResourceDescriptor::dns_record("example.com").depends_on(
            "target",
            ResourceRef::new(ResourceKind::Distribution, "example.com"),
        );

        let err = ctx.resolve_inputs(&record).unwrap_err();
        assert!(matches!(
            err,
            CloudError::DependencyUnavailable {
                kind: ResourceKind::DnsRecord,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_attribute() {
        let mut ctx = ProvisioningContext::new();
        ctx.insert(Handle::from_attributes(
            &ResourceDescriptor::bucket("bare"),
            ResourceAttributes::new("bare"),
        ));
        let distribution = ResourceDescriptor::distribution("example.com")
            .depends_on("origin", ResourceRef::new(ResourceKind::Bucket, "bare"));

        let inputs = ctx.resolve_inputs(&distribution).unwrap();
        assert!(inputs.require_attribute("origin", "website_endpoint").is_err());
    }
}

use async_trait::async_trait;
use sitestack_cloud::{
    AuthStatus, CloudError, CloudProvider, Operation, ResolvedInputs, ResourceAttributes,
    ResourceDescriptor, ResourceKind, ResourceRef, Result,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// One recorded provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: Operation,
    pub resource: ResourceRef,
    /// dependency name -> resolved id (create calls only)
    pub inputs: BTreeMap<String, String>,
}

/// In-memory provider that records every call
///
/// Created resources are remembered, so a second lookup finds them.
#[derive(Default)]
pub struct MockProvider {
    existing: Mutex<HashMap<ResourceRef, ResourceAttributes>>,
    calls: Mutex<Vec<Call>>,
    failures: HashMap<(ResourceKind, Operation), String>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend a resource already exists
    pub fn with_existing(self, kind: ResourceKind, key: &str, id: &str) -> Self {
        self.existing
            .lock()
            .unwrap()
            .insert(ResourceRef::new(kind, key), attributes_for(kind, key, id));
        self
    }

    /// Make every call of this kind and operation fail
    pub fn failing(mut self, kind: ResourceKind, operation: Operation, message: &str) -> Self {
        self.failures.insert((kind, operation), message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn creates(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.operation == Operation::Create)
            .collect()
    }

    fn record(&self, call: Call) -> Result<()> {
        let key = (call.resource.kind, call.operation);
        self.calls.lock().unwrap().push(call);
        match self.failures.get(&key) {
            Some(message) => Err(CloudError::ApiError(message.clone())),
            None => Ok(()),
        }
    }
}

pub fn mock_id(kind: ResourceKind, key: &str) -> String {
    format!("{}-id:{}", kind, key)
}

fn attributes_for(kind: ResourceKind, key: &str, id: &str) -> ResourceAttributes {
    let attrs = ResourceAttributes::new(id);
    match kind {
        ResourceKind::Bucket => {
            attrs.with_attribute("website_endpoint", format!("{}.s3-website.test", key))
        }
        ResourceKind::Distribution => {
            attrs.with_attribute("domain_name", format!("{}.cloudfront.test", key))
        }
        _ => attrs,
    }
}

#[async_trait]
impl CloudProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn display_name(&self) -> &str {
        "Mock"
    }

    async fn check_auth(&self) -> Result<AuthStatus> {
        Ok(AuthStatus::ok("mock-account"))
    }

    async fn describe(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> Result<Option<ResourceAttributes>> {
        self.record(Call {
            operation: Operation::Describe,
            resource: descriptor.reference(),
            inputs: BTreeMap::new(),
        })?;
        Ok(self
            .existing
            .lock()
            .unwrap()
            .get(&descriptor.reference())
            .cloned())
    }

    async fn create(
        &self,
        descriptor: &ResourceDescriptor,
        inputs: &ResolvedInputs,
    ) -> Result<ResourceAttributes> {
        self.record(Call {
            operation: Operation::Create,
            resource: descriptor.reference(),
            inputs: inputs
                .iter()
                .map(|(name, handle)| (name.clone(), handle.id.clone()))
                .collect(),
        })?;

        let attrs = attributes_for(
            descriptor.kind,
            &descriptor.key,
            &mock_id(descriptor.kind, &descriptor.key),
        );
        self.existing
            .lock()
            .unwrap()
            .insert(descriptor.reference(), attrs.clone());
        Ok(attrs)
    }
}

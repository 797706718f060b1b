//! Provisioning sequencer
//!
//! Runs get-or-create for an ordered list of descriptors, threading the
//! handles of earlier resources into the resources that depend on them.
//! The first failure aborts the run; resources ensured before it stay as
//! they are.

use crate::action::{Action, Plan};
use crate::context::ProvisioningContext;
use crate::error::{CloudError, Operation, Result};
use crate::manifest::Manifest;
use crate::provider::CloudProvider;
use crate::resource::{
    Handle, ResourceAttributes, ResourceDescriptor, ResourceRef, ResourceState,
};
use std::collections::HashSet;

pub struct Sequencer<'a> {
    provider: &'a dyn CloudProvider,
}

impl<'a> Sequencer<'a> {
    pub fn new(provider: &'a dyn CloudProvider) -> Self {
        Self { provider }
    }

    /// Check a descriptor list before any provider call
    ///
    /// Keys must be non-empty, references unique, and every dependency must
    /// point at a descriptor earlier in the list.
    pub fn validate(descriptors: &[ResourceDescriptor]) -> Result<()> {
        let mut seen: HashSet<ResourceRef> = HashSet::new();

        for descriptor in descriptors {
            validate_key(descriptor)?;

            for dependency in &descriptor.dependencies {
                if !seen.contains(&dependency.target) {
                    return Err(CloudError::InvalidConfig(format!(
                        "{} '{}' depends on {} which is not declared before it",
                        descriptor.kind, descriptor.key, dependency.target
                    )));
                }
            }

            if !seen.insert(descriptor.reference()) {
                return Err(CloudError::InvalidConfig(format!(
                    "{} is declared more than once",
                    descriptor.reference()
                )));
            }
        }

        Ok(())
    }

    /// Ensure one resource exists and return its handle
    pub async fn ensure(
        &self,
        descriptor: &ResourceDescriptor,
        ctx: &ProvisioningContext,
    ) -> Result<Handle> {
        let (_, handle) = self.ensure_with_state(descriptor, ctx).await?;
        Ok(handle)
    }

    /// [`Sequencer::ensure`], also reporting whether the resource was created
    pub async fn ensure_with_state(
        &self,
        descriptor: &ResourceDescriptor,
        ctx: &ProvisioningContext,
    ) -> Result<(ResourceState, Handle)> {
        validate_key(descriptor)?;

        if let Some(existing) = self.describe(descriptor).await? {
            tracing::debug!(
                "{} '{}' already exists: {}",
                descriptor.kind,
                descriptor.key,
                existing.id
            );
            return Ok((
                ResourceState::Exists,
                Handle::from_attributes(descriptor, existing),
            ));
        }

        let inputs = ctx.resolve_inputs(descriptor)?;

        tracing::info!("Creating {} '{}'", descriptor.kind, descriptor.key);
        let created = self
            .provider
            .create(descriptor, &inputs)
            .await
            .map_err(|e| e.for_resource(descriptor.kind, &descriptor.key, Operation::Create))?;
        tracing::info!(
            "Created {} '{}': {}",
            descriptor.kind,
            descriptor.key,
            created.id
        );

        Ok((
            ResourceState::Created,
            Handle::from_attributes(descriptor, created),
        ))
    }

    /// Ensure every descriptor, in order, and return the manifest
    pub async fn run(&self, descriptors: &[ResourceDescriptor]) -> Result<Manifest> {
        Self::validate(descriptors)?;

        let start = std::time::Instant::now();
        let mut manifest = Manifest::new(self.provider.name());
        let mut ctx = ProvisioningContext::new();

        for (index, descriptor) in descriptors.iter().enumerate() {
            tracing::debug!(
                "Step {}/{}: {} '{}'",
                index + 1,
                descriptors.len(),
                descriptor.kind,
                descriptor.key
            );

            let (state, handle) = self.ensure_with_state(descriptor, &ctx).await?;
            manifest.push(&handle, state);
            ctx.insert(handle);
        }

        manifest.duration_ms = start.elapsed().as_millis() as u64;
        Ok(manifest)
    }

    /// Existence checks only; never calls create
    pub async fn plan(&self, descriptors: &[ResourceDescriptor]) -> Result<Plan> {
        Self::validate(descriptors)?;

        let mut actions = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let action = match self.describe(descriptor).await? {
                Some(existing) => Action::no_op(descriptor, existing.id),
                None => Action::create(descriptor),
            };
            actions.push(action);
        }

        Ok(Plan::new(actions))
    }

    async fn describe(&self, descriptor: &ResourceDescriptor) -> Result<Option<ResourceAttributes>> {
        self.provider
            .describe(descriptor)
            .await
            .map_err(|e| e.for_resource(descriptor.kind, &descriptor.key, Operation::Describe))
    }
}

fn validate_key(descriptor: &ResourceDescriptor) -> Result<()> {
    if descriptor.key.trim().is_empty() {
        return Err(CloudError::InvalidConfig(format!(
            "{} has an empty key",
            descriptor.kind
        )));
    }
    Ok(())
}

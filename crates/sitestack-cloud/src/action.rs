//! Planned actions for a provisioning run

use crate::resource::{ResourceDescriptor, ResourceKind};
use serde::{Deserialize, Serialize};

/// Represents a planned action for a cloud resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Type of action to perform
    pub action_type: ActionType,

    pub kind: ResourceKind,

    /// Natural key of the resource
    pub key: String,

    /// Identifier of the existing resource, if any
    pub existing_id: Option<String>,

    /// Description of the action
    pub description: String,
}

impl Action {
    pub fn create(descriptor: &ResourceDescriptor) -> Self {
        Self {
            action_type: ActionType::Create,
            kind: descriptor.kind,
            key: descriptor.key.clone(),
            existing_id: None,
            description: format!("create {} {}", descriptor.kind, descriptor.key),
        }
    }

    pub fn no_op(descriptor: &ResourceDescriptor, existing_id: impl Into<String>) -> Self {
        let existing_id = existing_id.into();
        Self {
            action_type: ActionType::NoOp,
            kind: descriptor.kind,
            key: descriptor.key.clone(),
            description: format!(
                "{} {} already exists ({})",
                descriptor.kind, descriptor.key, existing_id
            ),
            existing_id: Some(existing_id),
        }
    }
}

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new resource
    Create,
    /// No changes needed
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Plan containing all actions to be applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// List of actions, in sequence order
    pub actions: Vec<Action>,

    /// Whether the plan has any changes
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions.iter().any(|a| a.action_type != ActionType::NoOp);
        Self {
            actions,
            has_changes,
        }
    }

    /// Get actions by type
    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    /// Summary of the plan
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} unchanged",
            self.create, self.no_change
        )
    }
}

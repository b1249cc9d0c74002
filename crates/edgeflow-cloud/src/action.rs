//! Action types for cloud resource reconciliation

use serde::{Deserialize, Serialize};

/// What a reconciliation did (or would do) to a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new resource
    Create,
    /// Update an existing resource
    Update,
    /// No changes needed
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Outcome of a controller run: the action taken and the resulting resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reconciled<T> {
    pub action: ActionType,
    pub resource: T,
}

impl<T> Reconciled<T> {
    pub fn new(action: ActionType, resource: T) -> Self {
        Self { action, resource }
    }

    pub fn is_noop(&self) -> bool {
        self.action == ActionType::NoOp
    }
}

/// A planned action for one resource, computed without mutating anything
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Resource type (e.g., "distribution", "dns-alias", "network")
    pub resource_type: String,

    /// Natural key of the resource
    pub resource_id: String,

    /// Type of action to perform
    pub action_type: ActionType,

    /// First field that differs, when the resource needs an update
    pub reason: Option<String>,
}

impl Action {
    pub fn new(
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        action_type: ActionType,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            action_type,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Plan containing all actions a reconciliation run would take
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Plan {
    /// List of actions to perform
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

    pub fn push(&mut self, action: Action) {
        self.has_changes |= action.action_type != ActionType::NoOp;
        self.actions.push(action);
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
            update: self.actions_by_type(ActionType::Update).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} unchanged",
            self.create, self.update, self.no_change
        )
    }
}

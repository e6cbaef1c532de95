// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{ResourceKind, Role, UserId};

pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    Export,
    Review,
}

impl Action {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Export => "export",
            Self::Review => "review",
        }
    }
}

/// Opaque permission check consulted during render. Implementations must
/// answer from in-memory session state only.
pub trait CapabilityOracle {
    fn has_permission(&self, resource: &str, action: &str) -> bool;

    fn role(&self) -> Option<Role> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub resource: String,
    pub action: String,
}

impl Permission {
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
        }
    }

    fn matches(&self, resource: &str, action: &str) -> bool {
        (self.resource == WILDCARD || self.resource == resource)
            && (self.action == WILDCARD || self.action == action)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
    permissions: BTreeSet<Permission>,
}

impl Session {
    pub fn new(
        token: impl Into<String>,
        user: SessionUser,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        Self {
            token: token.into(),
            user,
            permissions: permissions.into_iter().collect(),
        }
    }

    pub fn permissions(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }
}

impl CapabilityOracle for Session {
    fn has_permission(&self, resource: &str, action: &str) -> bool {
        self.permissions
            .iter()
            .any(|permission| permission.matches(resource, action))
    }

    fn role(&self) -> Option<Role> {
        Some(self.user.role)
    }
}

/// Declarative visibility rule. Pages combine permission checks as boolean
/// algebra; the combination is the authorization policy for that view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityRule {
    Always,
    Never,
    Require {
        resource: ResourceKind,
        action: Action,
    },
    RoleIn(&'static [Role]),
    Any(Vec<CapabilityRule>),
    All(Vec<CapabilityRule>),
}

impl CapabilityRule {
    pub const fn require(resource: ResourceKind, action: Action) -> Self {
        Self::Require { resource, action }
    }

    pub fn evaluate(&self, oracle: &dyn CapabilityOracle) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Require { resource, action } => {
                oracle.has_permission(resource.as_str(), action.as_str())
            }
            Self::RoleIn(roles) => oracle.role().is_some_and(|role| roles.contains(&role)),
            Self::Any(rules) => rules.iter().any(|rule| rule.evaluate(oracle)),
            Self::All(rules) => rules.iter().all(|rule| rule.evaluate(oracle)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDescriptor {
    pub resource: ResourceKind,
    pub view: CapabilityRule,
    pub create: CapabilityRule,
    pub update: CapabilityRule,
    pub delete: CapabilityRule,
    pub export: CapabilityRule,
    pub shortlist: CapabilityRule,
    /// `None` means create OR update OR delete.
    pub manage: Option<CapabilityRule>,
}

impl ViewDescriptor {
    pub fn standard(resource: ResourceKind) -> Self {
        Self {
            resource,
            view: CapabilityRule::require(resource, Action::Read),
            create: CapabilityRule::require(resource, Action::Create),
            update: CapabilityRule::require(resource, Action::Update),
            delete: CapabilityRule::require(resource, Action::Delete),
            export: CapabilityRule::require(resource, Action::Export),
            shortlist: CapabilityRule::Never,
            manage: None,
        }
    }

    pub fn evaluate(&self, oracle: &dyn CapabilityOracle) -> ViewCapabilities {
        let can_create = self.create.evaluate(oracle);
        let can_update = self.update.evaluate(oracle);
        let can_delete = self.delete.evaluate(oracle);
        let can_manage = match &self.manage {
            Some(rule) => rule.evaluate(oracle),
            None => can_create || can_update || can_delete,
        };
        ViewCapabilities {
            resource: self.resource,
            can_view: self.view.evaluate(oracle),
            can_create,
            can_update,
            can_delete,
            can_export: self.export.evaluate(oracle),
            can_shortlist: self.shortlist.evaluate(oracle),
            can_manage,
        }
    }
}

/// Capabilities of one view, computed once per render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewCapabilities {
    pub resource: ResourceKind,
    pub can_view: bool,
    pub can_create: bool,
    pub can_update: bool,
    pub can_delete: bool,
    pub can_export: bool,
    pub can_shortlist: bool,
    pub can_manage: bool,
}

impl ViewCapabilities {
    pub const fn none(resource: ResourceKind) -> Self {
        Self {
            resource,
            can_view: false,
            can_create: false,
            can_update: false,
            can_delete: false,
            can_export: false,
            can_shortlist: false,
            can_manage: false,
        }
    }
}

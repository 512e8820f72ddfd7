//! Role-based authorization for client-side actions.
//!
//! Roles map to permissions through a [`PolicyEngine`]. A role may also
//! *refuse* a permission explicitly, which is how the developer role is kept
//! away from project creation with its own message.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use studio_common::{ContestedRoles, PolicyConfig, Role, RoleSet};

/// Permission required to open the project creation view
pub const PROJECT_CREATE: &str = "project:create";

/// Shown when a developer account tries to create a project
pub const DEVELOPER_DENIED: &str = "You can't do that as a developer";

/// A role definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub role: Role,
    /// Human-readable name
    pub name: String,
    pub description: String,
    /// Permissions granted by this role
    pub permissions: Vec<String>,
    /// Permissions this role is explicitly refused
    #[serde(default)]
    pub refuses: Vec<String>,
    /// Message shown when a refusal applies
    #[serde(default)]
    pub denial_message: Option<String>,
}

/// Result of evaluating a permission against a role set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny { message: String },
    /// Some roles grant the permission while others refuse it
    Contested {
        granted_by: Vec<Role>,
        refused_by: Vec<Role>,
    },
}

/// Policy engine for evaluating permissions
pub struct PolicyEngine {
    definitions: Vec<RoleDefinition>,
    grants: HashMap<Role, HashSet<String>>,
    refusals: HashMap<Role, HashSet<String>>,
}

impl PolicyEngine {
    pub fn new() -> Self {
        let mut engine = Self {
            definitions: Vec::new(),
            grants: HashMap::new(),
            refusals: HashMap::new(),
        };
        engine.load_default_roles();
        engine
    }

    /// Built-in artist and developer roles
    fn load_default_roles(&mut self) {
        self.add_role(RoleDefinition {
            role: Role::Artist,
            name: "Artist".to_string(),
            description: "Creates projects and invites collaborators".to_string(),
            permissions: vec![PROJECT_CREATE.to_string(), "project:read".to_string()],
            refuses: vec![],
            denial_message: None,
        });
        self.add_role(RoleDefinition {
            role: Role::Developer,
            name: "Developer".to_string(),
            description: "Joins projects created by artists".to_string(),
            permissions: vec!["project:read".to_string()],
            refuses: vec![PROJECT_CREATE.to_string()],
            denial_message: Some(DEVELOPER_DENIED.to_string()),
        });
    }

    /// Add or replace a role definition
    pub fn add_role(&mut self, definition: RoleDefinition) {
        self.definitions.retain(|d| d.role != definition.role);
        self.grants.insert(
            definition.role.clone(),
            definition.permissions.iter().cloned().collect(),
        );
        self.refusals.insert(
            definition.role.clone(),
            definition.refuses.iter().cloned().collect(),
        );
        self.definitions.push(definition);
    }

    fn grants(&self, role: &Role, permission: &str) -> bool {
        self.grants.get(role).is_some_and(|perms| {
            perms.contains("*")
                || perms.contains(permission)
                || permission
                    .split_once(':')
                    .is_some_and(|(resource, _)| perms.contains(&format!("{}:*", resource)))
        })
    }

    fn refuses(&self, role: &Role, permission: &str) -> bool {
        self.refusals
            .get(role)
            .is_some_and(|perms| perms.contains(permission))
    }

    fn denial_message(&self, role: &Role) -> Option<&str> {
        self.definitions
            .iter()
            .find(|d| &d.role == role)
            .and_then(|d| d.denial_message.as_deref())
    }

    /// Evaluate a permission for a set of roles
    pub fn evaluate(&self, roles: &RoleSet, permission: &str) -> Verdict {
        let granted_by: Vec<Role> = roles
            .iter()
            .filter(|r| self.grants(r, permission))
            .cloned()
            .collect();
        let refused_by: Vec<Role> = roles
            .iter()
            .filter(|r| self.refuses(r, permission))
            .cloned()
            .collect();

        match (granted_by.is_empty(), refused_by.is_empty()) {
            (false, false) => Verdict::Contested { granted_by, refused_by },
            (false, true) => Verdict::Allow,
            (true, false) => Verdict::Deny {
                message: refused_by
                    .iter()
                    .find_map(|r| self.denial_message(r))
                    .map(str::to_string)
                    .unwrap_or_else(|| generic_denial(roles)),
            },
            (true, true) => Verdict::Deny {
                message: generic_denial(roles),
            },
        }
    }

    pub fn has_permission(&self, roles: &RoleSet, permission: &str) -> bool {
        matches!(self.evaluate(roles, permission), Verdict::Allow)
    }

    pub fn roles(&self) -> &[RoleDefinition] {
        &self.definitions
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn generic_denial(roles: &RoleSet) -> String {
    if roles.is_empty() {
        "You need an account to do that".to_string()
    } else {
        format!("You can't do that as a {}", roles.describe())
    }
}

/// Final decision for a gated action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Granted,
    Denied(String),
}

/// Project-creation gate: the engine plus the contested-roles setting
pub struct RolePolicy {
    engine: PolicyEngine,
    contested: ContestedRoles,
}

impl RolePolicy {
    pub fn new(engine: PolicyEngine, contested: ContestedRoles) -> Self {
        Self { engine, contested }
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(PolicyEngine::new(), config.contested_roles)
    }

    pub fn engine(&self) -> &PolicyEngine {
        &self.engine
    }

    pub fn authorize_project_creation(&self, roles: &RoleSet) -> Authorization {
        match self.engine.evaluate(roles, PROJECT_CREATE) {
            Verdict::Allow => Authorization::Granted,
            Verdict::Deny { message } => Authorization::Denied(message),
            Verdict::Contested { refused_by, .. } => match self.contested {
                ContestedRoles::Allow => Authorization::Granted,
                ContestedRoles::Deny => Authorization::Denied(
                    refused_by
                        .iter()
                        .find_map(|r| self.engine.denial_message(r))
                        .map(str::to_string)
                        .unwrap_or_else(|| generic_denial(roles)),
                ),
            },
        }
    }

    pub fn can_create_project(&self, roles: &RoleSet) -> bool {
        self.authorize_project_creation(roles) == Authorization::Granted
    }
}

impl Default for RolePolicy {
    fn default() -> Self {
        Self::from_config(&PolicyConfig::default())
    }
}

/// Whether a role set may create projects under the default policy
pub fn can_create_project(roles: &RoleSet) -> bool {
    RolePolicy::default().can_create_project(roles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn roles(tags: &[&str]) -> RoleSet {
        tags.iter().map(|t| Role::from(*t)).collect()
    }

    #[test_case(&["artist"], true ; "artist may create")]
    #[test_case(&["developer"], false ; "developer may not")]
    #[test_case(&["curator"], false ; "unknown role may not")]
    #[test_case(&[], false ; "no roles may not")]
    fn test_can_create_project(tags: &[&str], expected: bool) {
        assert_eq!(can_create_project(&roles(tags)), expected);
    }

    #[test]
    fn test_developer_denial_message() {
        let policy = RolePolicy::default();
        assert_eq!(
            policy.authorize_project_creation(&roles(&["developer"])),
            Authorization::Denied(DEVELOPER_DENIED.to_string())
        );
    }

    #[test]
    fn test_unknown_role_gets_generic_denial() {
        let engine = PolicyEngine::new();
        assert_eq!(
            engine.evaluate(&roles(&["curator"]), PROJECT_CREATE),
            Verdict::Deny {
                message: "You can't do that as a curator".to_string()
            }
        );
    }

    // Artist plus developer in one signup response has no agreed product
    // behaviour yet. The engine reports it as contested and the outcome
    // comes from `policy.contested_roles`.
    #[test]
    fn test_mixed_artist_developer_is_contested_and_unspecified() {
        let engine = PolicyEngine::new();
        let mixed = roles(&["artist", "developer"]);
        assert_eq!(
            engine.evaluate(&mixed, PROJECT_CREATE),
            Verdict::Contested {
                granted_by: vec![Role::Artist],
                refused_by: vec![Role::Developer],
            }
        );

        let allow = RolePolicy::new(PolicyEngine::new(), ContestedRoles::Allow);
        assert!(allow.can_create_project(&mixed));

        let deny = RolePolicy::new(PolicyEngine::new(), ContestedRoles::Deny);
        assert_eq!(
            deny.authorize_project_creation(&mixed),
            Authorization::Denied(DEVELOPER_DENIED.to_string())
        );
    }

    #[test]
    fn test_wildcard_permissions() {
        let mut engine = PolicyEngine::new();
        engine.add_role(RoleDefinition {
            role: Role::from("admin"),
            name: "Administrator".to_string(),
            description: "Full access".to_string(),
            permissions: vec!["*".to_string()],
            refuses: vec![],
            denial_message: None,
        });
        engine.add_role(RoleDefinition {
            role: Role::from("producer"),
            name: "Producer".to_string(),
            description: "Manages projects".to_string(),
            permissions: vec!["project:*".to_string()],
            refuses: vec![],
            denial_message: None,
        });

        assert!(engine.has_permission(&roles(&["admin"]), PROJECT_CREATE));
        assert!(engine.has_permission(&roles(&["producer"]), PROJECT_CREATE));
        assert!(!engine.has_permission(&roles(&["producer"]), "billing:read"));
    }

    #[test]
    fn test_add_role_replaces_definition() {
        let mut engine = PolicyEngine::new();
        engine.add_role(RoleDefinition {
            role: Role::Developer,
            name: "Developer".to_string(),
            description: "Allowed after all".to_string(),
            permissions: vec![PROJECT_CREATE.to_string()],
            refuses: vec![],
            denial_message: None,
        });
        assert_eq!(engine.roles().len(), 2);
        assert!(engine.has_permission(&roles(&["developer"]), PROJECT_CREATE));
    }
}

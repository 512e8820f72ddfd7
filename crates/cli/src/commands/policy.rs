//! Policy Commands

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;

use studio_client::policy::{RoleDefinition, PROJECT_CREATE};
use studio_client::{Authorization, RolePolicy, Verdict};
use studio_common::{ClientConfig, ContestedRoles, Role, RoleSet};

use crate::output::{print_item, print_list, OutputFormat, TableDisplay};

#[derive(Subcommand)]
pub enum PolicyCommands {
    /// Check whether a role set may create projects
    Check {
        /// Role to include (repeatable)
        #[arg(long = "role", required = true)]
        roles: Vec<Role>,

        /// Deny when artist and developer are both present
        #[arg(long)]
        deny_contested: bool,
    },

    /// List the built-in roles
    Roles,
}

#[derive(Serialize)]
pub struct CheckDisplay {
    pub roles: String,
    pub permission: String,
    pub verdict: String,
    pub allowed: bool,
    pub message: Option<String>,
}

impl TableDisplay for CheckDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Roles", "Permission", "Verdict", "Allowed", "Message"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.roles.clone(),
            self.permission.clone(),
            self.verdict.clone(),
            self.allowed.to_string(),
            self.message.clone().unwrap_or_default(),
        ]
    }
}

#[derive(Serialize)]
pub struct RoleDisplay {
    pub role: String,
    pub name: String,
    pub permissions: Vec<String>,
    pub refuses: Vec<String>,
}

impl From<&RoleDefinition> for RoleDisplay {
    fn from(def: &RoleDefinition) -> Self {
        Self {
            role: def.role.to_string(),
            name: def.name.clone(),
            permissions: def.permissions.clone(),
            refuses: def.refuses.clone(),
        }
    }
}

impl TableDisplay for RoleDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Role", "Name", "Permissions", "Refuses"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.role.clone(),
            self.name.clone(),
            self.permissions.join(", "),
            self.refuses.join(", "),
        ]
    }
}

pub fn check(roles: Vec<Role>, contested: ContestedRoles) -> CheckDisplay {
    let roles: RoleSet = roles.into_iter().collect();
    let policy = RolePolicy::new(Default::default(), contested);

    let verdict = match policy.engine().evaluate(&roles, PROJECT_CREATE) {
        Verdict::Allow => "allow",
        Verdict::Deny { .. } => "deny",
        Verdict::Contested { .. } => "contested",
    };
    let (allowed, message) = match policy.authorize_project_creation(&roles) {
        Authorization::Granted => (true, None),
        Authorization::Denied(message) => (false, Some(message)),
    };

    CheckDisplay {
        roles: roles.describe(),
        permission: PROJECT_CREATE.to_string(),
        verdict: verdict.to_string(),
        allowed,
        message,
    }
}

pub fn execute(cmd: PolicyCommands, config: &ClientConfig, format: OutputFormat) -> Result<()> {
    match cmd {
        PolicyCommands::Check { roles, deny_contested } => {
            let contested = if deny_contested {
                ContestedRoles::Deny
            } else {
                config.policy.contested_roles
            };
            print_item(&check(roles, contested), format);
        }

        PolicyCommands::Roles => {
            let policy = RolePolicy::from_config(&config.policy);
            let roles: Vec<RoleDisplay> = policy.engine().roles().iter().map(RoleDisplay::from).collect();
            print_list(&roles, format);
        }
    }

    Ok(())
}

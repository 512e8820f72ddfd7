//! Create Project Command
//!
//! Runs the "create project" flow against the configured signup endpoint,
//! signing up first when the session is anonymous.

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;
use tracing::debug;

use studio_client::{AppContext, Outcome, Route, SignupForm};
use studio_common::{Action, ClientConfig, Identity, Role};

use crate::output::{print_item, print_warning, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct CreateProjectArgs {
    /// Email to sign up with
    #[arg(long)]
    pub email: Option<String>,

    /// Password to sign up with
    #[arg(long, env = "STUDIO_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Requested role (repeatable)
    #[arg(long = "role", default_value = "artist")]
    pub roles: Vec<Role>,

    /// Start from an already signed-in session with this email
    #[arg(long)]
    pub seed_email: Option<String>,

    /// Display name for the seeded session
    #[arg(long, requires = "seed_email")]
    pub seed_name: Option<String>,

    /// Role of the seeded session (repeatable)
    #[arg(long = "seed-role", requires = "seed_email")]
    pub seed_roles: Vec<Role>,
}

/// Outcome display wrapper for serialization
#[derive(Serialize)]
pub struct OutcomeDisplay {
    pub state: String,
    pub route: String,
    pub notice: Option<String>,
    pub messages: Vec<String>,
}

impl OutcomeDisplay {
    fn new(outcome: &Outcome, messages: Vec<String>) -> Self {
        Self {
            state: outcome.state.to_string(),
            route: outcome.route.path().to_string(),
            notice: outcome.notice.clone(),
            messages,
        }
    }
}

impl TableDisplay for OutcomeDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["State", "Route", "Notice", "Queued Messages"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.state.clone(),
            self.route.clone(),
            self.notice.clone().unwrap_or_default(),
            self.messages.len().to_string(),
        ]
    }
}

/// Returns whether the flow reached the project creation view
pub async fn execute(args: CreateProjectArgs, config: ClientConfig, format: OutputFormat) -> Result<bool> {
    let context = AppContext::new(config);

    if let Some(email) = args.seed_email {
        let roles = if args.seed_roles.is_empty() {
            vec![Role::Artist]
        } else {
            args.seed_roles
        };
        let identity = Identity::new(args.seed_name, email, roles)?;
        debug!(email = %identity.email, "Seeding session");
        context.session().dispatch(Action::SetCurrentUser(identity));
    }

    let mut controller = context.controller()?;
    let mut outcome = controller.on_create_project();

    if outcome.route != Route::CreateProject {
        let (Some(email), Some(password)) = (args.email, args.password) else {
            bail!("Signup required: pass --email and --password (or STUDIO_PASSWORD)");
        };
        let form = SignupForm::new(email, password, args.roles);
        outcome = controller.submit_signup(&form).await;
    }

    let messages = context.session().state().messages.message;
    print_item(&OutcomeDisplay::new(&outcome, messages), format);

    let reached = outcome.navigated_to_create_project();
    if let (false, Some(notice)) = (reached, &outcome.notice) {
        print_warning(notice);
    }
    Ok(reached)
}

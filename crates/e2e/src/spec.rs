//! Declarative YAML scenario specification

use serde::{Deserialize, Serialize};
use std::path::Path;

use studio_client::ControllerState;
use studio_common::Role;

use crate::error::{E2eError, E2eResult};

/// A complete scenario parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSpec {
    /// Unique name for this test
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering tests
    #[serde(default)]
    pub tags: Vec<String>,

    /// Steps to execute in order
    pub steps: Vec<TestStep>,
}

/// A single step in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Populate the session without a network round trip
    SeedUser {
        #[serde(default)]
        name: Option<String>,
        email: String,
        roles: Vec<Role>,
    },

    /// Answer a method + path with a fixture
    Intercept {
        #[serde(default)]
        alias: Option<String>,
        #[serde(default)]
        method: Option<String>,
        #[serde(default)]
        path: Option<String>,
        /// Defaults to the fixture's usual status
        #[serde(default)]
        status: Option<u16>,
        /// Bundled or on-disk fixture name
        #[serde(default)]
        fixture: Option<String>,
        /// Inline body, used when no fixture is named
        #[serde(default)]
        body: Option<serde_json::Value>,
    },

    /// Click "create project"
    CreateProject,

    /// Fill and submit the signup form
    SignUp {
        email: String,
        password: String,
        roles: Vec<Role>,
    },

    /// Current route contains this path
    AssertUrl { includes: String },

    /// Displayed text contains this string
    AssertText { contains: String },

    /// Message queue length, optionally with one entry's text
    AssertMessages {
        count: usize,
        #[serde(default)]
        contains: Option<String>,
    },

    /// A recorded request matches
    AssertRequest {
        #[serde(default)]
        alias: Option<String>,
        #[serde(default)]
        method: Option<String>,
        #[serde(default)]
        status: Option<u16>,
        /// Expected `params` object of the request body
        #[serde(default)]
        params: Option<serde_json::Value>,
    },

    /// Exact number of requests the fixture server has seen
    AssertRequestCount { count: usize },

    /// Controller state
    AssertState { state: ControllerState },

    /// Log a message (for debugging)
    Log { message: String },
}

impl TestStep {
    /// Short label for reports and logs
    pub fn name(&self) -> String {
        match self {
            TestStep::SeedUser { email, .. } => format!("seed_user:{}", email),
            TestStep::Intercept { alias, path, .. } => format!(
                "intercept:{}",
                alias.as_deref().or(path.as_deref()).unwrap_or("/auth")
            ),
            TestStep::CreateProject => "create_project".to_string(),
            TestStep::SignUp { email, .. } => format!("sign_up:{}", email),
            TestStep::AssertUrl { includes } => format!("assert_url:{}", includes),
            TestStep::AssertText { contains } => format!("assert_text:{}", contains),
            TestStep::AssertMessages { count, .. } => format!("assert_messages:{}", count),
            TestStep::AssertRequest { alias, .. } => {
                format!("assert_request:{}", alias.as_deref().unwrap_or("last"))
            }
            TestStep::AssertRequestCount { count } => format!("assert_request_count:{}", count),
            TestStep::AssertState { state } => format!("assert_state:{}", state),
            TestStep::Log { message } => {
                format!("log:{}", message.chars().take(30).collect::<String>())
            }
        }
    }
}

impl TestSpec {
    /// Parse a test spec from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let spec: Self = serde_yaml::from_str(yaml)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Parse a test spec from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all test specs from a directory, sorted by name
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut specs = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            let spec = Self::from_file(entry.path())?;
            specs.push(spec);
        }

        specs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(specs)
    }

    /// Filter specs by tag
    pub fn filter_by_tag<'a>(specs: &'a [Self], tag: &str) -> Vec<&'a Self> {
        specs.iter().filter(|s| s.tags.iter().any(|t| t == tag)).collect()
    }

    fn validate(&self) -> E2eResult<()> {
        if self.name.trim().is_empty() {
            return Err(E2eError::SpecParse("spec has no name".to_string()));
        }
        for step in &self.steps {
            if let TestStep::Intercept { fixture: None, body: None, .. } = step {
                return Err(E2eError::SpecParse(format!(
                    "{}: intercept needs a fixture or a body",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

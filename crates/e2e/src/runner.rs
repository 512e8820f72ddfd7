//! Main test runner that orchestrates the fixture server and the signup
//! controller for each scenario

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info};

use studio_client::{AppContext, HttpSignupTransport, Outcome, SignupController, SignupForm};
use studio_common::{Action, ClientConfig, Identity, PolicyConfig};

use crate::error::{E2eError, E2eResult};
use crate::fixtures;
use crate::server::{FixtureServer, Intercept, ServerConfig};
use crate::spec::{TestSpec, TestStep};

/// Result of executing a test step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Result of running a single test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    /// Where the scenario ended up
    pub final_outcome: Option<Outcome>,
    pub error: Option<String>,
}

/// Result of running all tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub started_at: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

/// Configuration for the test runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub server: ServerConfig,
    /// Policy handed to every scenario's controller
    pub policy: PolicyConfig,
    pub specs_dir: PathBuf,
    /// Extra fixtures looked up by name after the bundled ones
    pub fixtures_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            policy: PolicyConfig::default(),
            specs_dir: PathBuf::from("specs"),
            fixtures_dir: None,
            output_dir: PathBuf::from("test-results"),
        }
    }
}

/// Main E2E test runner
pub struct TestRunner {
    config: RunnerConfig,
}

impl TestRunner {
    /// Create a new test runner with default configuration
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    /// Create a test runner with custom configuration
    pub fn with_config(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Run all tests in the specs directory
    pub async fn run_all(&self) -> E2eResult<TestSuiteResult> {
        let specs = TestSpec::load_all(&self.config.specs_dir)?;
        self.run_specs(&specs).await
    }

    /// Run tests matching a tag
    pub async fn run_tagged(&self, tag: &str) -> E2eResult<TestSuiteResult> {
        let specs = TestSpec::load_all(&self.config.specs_dir)?;
        let filtered: Vec<TestSpec> = TestSpec::filter_by_tag(&specs, tag)
            .into_iter()
            .cloned()
            .collect();
        self.run_specs(&filtered).await
    }

    /// Run a specific test by name
    pub async fn run_test(&self, name: &str) -> E2eResult<TestResult> {
        let specs = TestSpec::load_all(&self.config.specs_dir)?;
        let spec = specs
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::SpecParse(format!("Test not found: {}", name)))?;

        self.run_spec(&spec).await
    }

    /// Run a list of test specs
    pub async fn run_specs(&self, specs: &[TestSpec]) -> E2eResult<TestSuiteResult> {
        let started_at = chrono::Utc::now().to_rfc3339();
        let start = Instant::now();
        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;

        info!("Running {} test(s)...", specs.len());

        for spec in specs {
            match self.run_spec(spec).await {
                Ok(result) => {
                    if result.success {
                        passed += 1;
                        info!("✓ {} ({} ms)", result.name, result.duration_ms);
                    } else {
                        failed += 1;
                        error!(
                            "✗ {} - {}",
                            result.name,
                            result.error.as_deref().unwrap_or("unknown error")
                        );
                    }
                    results.push(result);
                }
                Err(e) => {
                    failed += 1;
                    error!("✗ {} - {}", spec.name, e);
                    results.push(TestResult {
                        name: spec.name.clone(),
                        success: false,
                        duration_ms: 0,
                        steps: vec![],
                        final_outcome: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Test Results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        Ok(TestSuiteResult {
            started_at,
            total: specs.len(),
            passed,
            failed,
            duration_ms,
            results,
        })
    }

    /// Run a single test spec against a fresh fixture server and session
    pub async fn run_spec(&self, spec: &TestSpec) -> E2eResult<TestResult> {
        let start = Instant::now();
        debug!("Running test: {}", spec.name);

        let server = FixtureServer::spawn(self.config.server.clone()).await?;

        let mut client_config = ClientConfig::default();
        client_config.api.base_url = server.base_url().to_string();
        client_config.policy = self.config.policy.clone();

        let context = AppContext::new(client_config);
        let mut scenario = Scenario {
            server: &server,
            controller: context.controller()?,
            outcome: None,
            fixtures_dir: self.config.fixtures_dir.clone(),
        };

        let mut step_results = Vec::new();
        let mut test_error: Option<String> = None;

        for step in &spec.steps {
            let step_start = Instant::now();
            let step_name = step.name();
            debug!("Executing step: {}", step_name);

            let result = scenario.execute(step).await;
            let duration_ms = step_start.elapsed().as_millis() as u64;

            match result {
                Ok(()) => step_results.push(StepResult {
                    success: true,
                    step_name,
                    duration_ms,
                    error: None,
                }),
                Err(e) => {
                    let reason = E2eError::StepFailed {
                        step: step_name.clone(),
                        reason: e.to_string(),
                    }
                    .to_string();
                    step_results.push(StepResult {
                        success: false,
                        step_name,
                        duration_ms,
                        error: Some(reason.clone()),
                    });
                    test_error = Some(reason);
                    break; // Stop on first failure
                }
            }
        }

        let final_outcome = Some(scenario.controller.outcome());
        drop(scenario);
        server.stop().await;

        Ok(TestResult {
            name: spec.name.clone(),
            success: test_error.is_none(),
            duration_ms: start.elapsed().as_millis() as u64,
            steps: step_results,
            final_outcome,
            error: test_error,
        })
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Live state of one scenario
struct Scenario<'a> {
    server: &'a FixtureServer,
    controller: SignupController<HttpSignupTransport>,
    outcome: Option<Outcome>,
    fixtures_dir: Option<PathBuf>,
}

impl Scenario<'_> {
    async fn execute(&mut self, step: &TestStep) -> E2eResult<()> {
        match step {
            TestStep::SeedUser { name, email, roles } => {
                let identity = Identity::new(name.clone(), email.clone(), roles.clone())?;
                self.controller
                    .session()
                    .dispatch(Action::SetCurrentUser(identity));
                Ok(())
            }
            TestStep::Intercept {
                alias,
                method,
                path,
                status,
                fixture,
                body,
            } => {
                let bundled = fixture.as_deref().and_then(fixtures::Fixture::from_name);
                let response = match (fixture, body) {
                    (Some(name), _) => fixtures::load(name, self.fixtures_dir.as_deref())?,
                    (None, Some(body)) => body.clone(),
                    (None, None) => {
                        return Err(E2eError::SpecParse(
                            "intercept needs a fixture or a body".to_string(),
                        ))
                    }
                };
                let status = status
                    .or(bundled.map(|f| f.status()))
                    .unwrap_or(200);

                self.server.intercept(Intercept {
                    alias: alias.clone(),
                    method: method.clone().unwrap_or_else(|| "POST".to_string()),
                    path: path.clone().unwrap_or_else(|| "/auth".to_string()),
                    status,
                    body: response,
                });
                Ok(())
            }
            TestStep::CreateProject => {
                self.outcome = Some(self.controller.on_create_project());
                Ok(())
            }
            TestStep::SignUp {
                email,
                password,
                roles,
            } => {
                let form = SignupForm::new(email.clone(), password.clone(), roles.clone());
                self.outcome = Some(self.controller.submit_signup(&form).await);
                Ok(())
            }
            TestStep::AssertUrl { includes } => {
                let route = self.controller.route();
                check(
                    route.path().contains(includes.as_str()),
                    format!("expected url to include {:?}, got {:?}", includes, route.path()),
                )
            }
            TestStep::AssertText { contains } => {
                let notice = self
                    .outcome
                    .as_ref()
                    .and_then(|o| o.notice.clone())
                    .unwrap_or_default();
                check(
                    notice.contains(contains.as_str()),
                    format!("expected displayed text to contain {:?}, got {:?}", contains, notice),
                )
            }
            TestStep::AssertMessages { count, contains } => {
                let state = self.controller.session().state();
                check(
                    state.messages.len() == *count,
                    format!(
                        "expected {} queued message(s), got {:?}",
                        count, state.messages.message
                    ),
                )?;
                match contains {
                    Some(text) => check(
                        state.messages.message.iter().any(|m| m.contains(text.as_str())),
                        format!("no queued message contains {:?}", text),
                    ),
                    None => Ok(()),
                }
            }
            TestStep::AssertRequest {
                alias,
                method,
                status,
                params,
            } => {
                let recorded = match alias {
                    Some(alias) => self.server.request_for(alias),
                    None => self.server.requests().pop(),
                }
                .ok_or_else(|| {
                    E2eError::AssertionFailed(format!(
                        "no request recorded for {}",
                        alias.as_deref().unwrap_or("any intercept")
                    ))
                })?;

                if let Some(method) = method {
                    check(
                        recorded.method.eq_ignore_ascii_case(method),
                        format!("expected method {}, got {}", method, recorded.method),
                    )?;
                }
                if let Some(status) = status {
                    check(
                        recorded.status == *status,
                        format!("expected status {}, got {}", status, recorded.status),
                    )?;
                }
                if let Some(params) = params {
                    check(
                        &recorded.body["params"] == params,
                        format!(
                            "expected params {}, got {}",
                            params, recorded.body["params"]
                        ),
                    )?;
                }
                Ok(())
            }
            TestStep::AssertRequestCount { count } => {
                let seen = self.server.request_count();
                check(
                    seen == *count,
                    format!("expected {} request(s), fixture server saw {}", count, seen),
                )
            }
            TestStep::AssertState { state } => {
                let actual = self.controller.state();
                check(
                    actual == *state,
                    format!("expected state {}, got {}", state, actual),
                )
            }
            TestStep::Log { message } => {
                info!("[TEST LOG] {}", message);
                Ok(())
            }
        }
    }
}

fn check(condition: bool, failure: String) -> E2eResult<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(failure))
    }
}

//! Studio E2E Test Framework
//!
//! Drives the signup controller against an in-process fixture server the
//! same way the browser suite drives the app against intercepted requests:
//! - Serves canned signup responses per scenario
//! - Records every request so bodies and statuses can be asserted
//! - Parses declarative YAML scenario specs
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── FixtureServer::spawn() per scenario                  │
//! │    ├── AppContext::controller() -> SignupController         │
//! │    └── run_spec(spec: TestSpec) -> TestResult               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestSpec (YAML)                                            │
//! │    ├── name, description, tags                              │
//! │    └── steps: [Step]                                        │
//! │          ├── seed_user { name, email, roles }               │
//! │          ├── intercept { alias, status, fixture | body }    │
//! │          ├── create_project                                 │
//! │          ├── sign_up { email, password, roles }             │
//! │          └── assert_{url,text,messages,request,state}       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod fixtures;
pub mod runner;
pub mod server;
pub mod spec;

pub use error::{E2eError, E2eResult};
pub use runner::TestRunner;
pub use spec::{TestSpec, TestStep};

//! Studio signup client
//!
//! Client side of account creation: the controller behind the
//! "create project" button, the role policy that gates it, and the
//! transport that talks to the signup endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  AppContext                                              │
//! │    ├── SessionHandle (user + message queue)              │
//! │    └── controller() -> SignupController                  │
//! ├──────────────────────────────────────────────────────────┤
//! │  SignupController                                        │
//! │    ├── on_create_project() -> Outcome                    │
//! │    ├── submit_signup(form) -> Outcome                    │
//! │    ├── RolePolicy (PolicyEngine + contested setting)     │
//! │    └── SignupTransport (HttpSignupTransport)             │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod context;
pub mod controller;
pub mod error;
pub mod policy;
pub mod route;
pub mod signup;
pub mod transport;

pub use context::AppContext;
pub use controller::{ControllerState, Outcome, SignupController};
pub use error::{ClientError, ClientResult};
pub use policy::{can_create_project, Authorization, PolicyEngine, RolePolicy, Verdict};
pub use route::Route;
pub use signup::{SignupForm, SignupRequest, SignupResult};
pub use transport::{HttpSignupTransport, SignupTransport};

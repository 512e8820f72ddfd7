//! Navigation targets the signup flow can land on

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// Landing page before any action
    #[default]
    #[serde(rename = "/")]
    Home,
    /// Signup / login view
    #[serde(rename = "/auth")]
    Auth,
    /// Project creation form
    #[serde(rename = "/projects/create")]
    CreateProject,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Auth => "/auth",
            Route::CreateProject => "/projects/create",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

//! Canned signup responses served by the fixture server

use std::path::Path;

use crate::error::{E2eError, E2eResult};

/// Fixtures bundled with the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixture {
    ArtistAccount,
    DeveloperAccount,
    EmailTaken,
}

impl Fixture {
    pub const ALL: [Fixture; 3] = [
        Fixture::ArtistAccount,
        Fixture::DeveloperAccount,
        Fixture::EmailTaken,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Fixture::ArtistAccount => "createAccountResponseForArtistAccount",
            Fixture::DeveloperAccount => "createAccountResponseForDeveloperAccount",
            Fixture::EmailTaken => "createAccountResponseError",
        }
    }

    /// Status the fixture is normally served with
    pub fn status(&self) -> u16 {
        match self {
            Fixture::ArtistAccount | Fixture::DeveloperAccount => 201,
            Fixture::EmailTaken => 422,
        }
    }

    fn raw(&self) -> &'static str {
        match self {
            Fixture::ArtistAccount => {
                include_str!("../fixtures/createAccountResponseForArtistAccount.json")
            }
            Fixture::DeveloperAccount => {
                include_str!("../fixtures/createAccountResponseForDeveloperAccount.json")
            }
            Fixture::EmailTaken => include_str!("../fixtures/createAccountResponseError.json"),
        }
    }

    pub fn body(&self) -> E2eResult<serde_json::Value> {
        Ok(serde_json::from_str(self.raw())?)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.strip_suffix(".json").unwrap_or(name);
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

/// Resolve a fixture by name: bundled fixtures first, then `<dir>/<name>.json`
pub fn load(name: &str, dir: Option<&Path>) -> E2eResult<serde_json::Value> {
    if let Some(fixture) = Fixture::from_name(name) {
        return fixture.body();
    }

    let dir = dir.ok_or_else(|| E2eError::FixtureNotFound(name.to_string()))?;
    let file = if name.ends_with(".json") {
        dir.join(name)
    } else {
        dir.join(format!("{}.json", name))
    };
    if !file.exists() {
        return Err(E2eError::FixtureNotFound(file.display().to_string()));
    }
    let content = std::fs::read_to_string(&file)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_fixtures_parse() {
        for fixture in Fixture::ALL {
            assert!(fixture.body().is_ok(), "{} should be valid JSON", fixture.name());
        }
    }

    #[test]
    fn test_error_fixture_has_one_message() {
        let body = Fixture::EmailTaken.body().unwrap();
        assert_eq!(body["messages"]["message"], serde_json::json!(["Email has been taken."]));
    }

    #[test]
    fn test_lookup_accepts_json_suffix() {
        assert_eq!(
            Fixture::from_name("createAccountResponseError.json"),
            Some(Fixture::EmailTaken)
        );
        assert!(Fixture::from_name("unknown").is_none());
    }

    #[test]
    fn test_unknown_fixture_without_dir() {
        assert!(matches!(load("missing", None), Err(E2eError::FixtureNotFound(_))));
    }
}

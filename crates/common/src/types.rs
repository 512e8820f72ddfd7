//! Core identity types shared by the session store and the signup flow.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A capability tag granted by the signup backend.
///
/// Tags outside the known vocabulary are kept verbatim so that a session
/// round-trips whatever the server provisioned.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Artist,
    Developer,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Artist => "artist",
            Role::Developer => "developer",
            Role::Other(tag) => tag,
        }
    }
}

impl From<String> for Role {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "artist" => Role::Artist,
            "developer" => Role::Developer,
            _ => Role::Other(tag),
        }
    }
}

impl From<&str> for Role {
    fn from(tag: &str) -> Self {
        Role::from(tag.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Role {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Role::from(s))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of roles held by a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, role: &Role) -> bool {
        self.0.contains(role)
    }

    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.0.iter()
    }

    /// Role tags joined for display, e.g. `artist, developer`
    pub fn describe(&self) -> String {
        self.0
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RoleSet {
    type Item = &'a Role;
    type IntoIter = std::collections::btree_set::Iter<'a, Role>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Wire shape of an identity before validation
#[derive(Debug, Clone, Deserialize)]
struct IdentityRecord {
    #[serde(default)]
    name: Option<String>,
    email: String,
    roles: Vec<Role>,
}

/// A fully populated user identity.
///
/// Construction and decoding both reject an empty email or an empty role
/// set, so a session is never half authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IdentityRecord")]
pub struct Identity {
    pub name: Option<String>,
    pub email: String,
    pub roles: RoleSet,
}

impl Identity {
    pub fn new(
        name: Option<String>,
        email: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Result<Self> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(Error::InvalidIdentity("identity is missing an email".to_string()));
        }
        let roles: RoleSet = roles.into_iter().collect();
        if roles.is_empty() {
            return Err(Error::InvalidIdentity(format!(
                "identity {} has no roles",
                email
            )));
        }
        Ok(Self { name, email, roles })
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }
}

impl TryFrom<IdentityRecord> for Identity {
    type Error = Error;

    fn try_from(record: IdentityRecord) -> Result<Self> {
        Identity::new(record.name, record.email, record.roles)
    }
}

/// Who is using the application right now
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CurrentUser {
    #[default]
    Anonymous,
    Authenticated(Identity),
}

impl CurrentUser {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            CurrentUser::Anonymous => None,
            CurrentUser::Authenticated(identity) => Some(identity),
        }
    }

    /// True once the session holds a non-empty role set
    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some_and(|identity| !identity.roles.is_empty())
    }

    pub fn roles(&self) -> Option<&RoleSet> {
        self.identity().map(|identity| &identity.roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("artist", Role::Artist ; "artist")]
    #[test_case("developer", Role::Developer ; "developer")]
    #[test_case("curator", Role::Other("curator".to_string()) ; "unknown tag kept")]
    fn test_role_from_tag(tag: &str, expected: Role) {
        assert_eq!(Role::from(tag), expected);
        assert_eq!(String::from(expected), tag);
    }

    #[test]
    fn test_identity_decodes_from_payload() {
        let identity: Identity = serde_json::from_str(
            r#"{"name":"Thomas","email":"thomas@random.com","roles":["artist","developer"]}"#,
        )
        .unwrap();
        assert_eq!(identity.name.as_deref(), Some("Thomas"));
        assert!(identity.has_role(&Role::Artist));
        assert!(identity.has_role(&Role::Developer));
    }

    #[test]
    fn test_identity_rejects_empty_roles() {
        let err = serde_json::from_str::<Identity>(r#"{"email":"a@b.c","roles":[]}"#);
        assert!(err.is_err());
        assert!(Identity::new(None, "a@b.c", Vec::new()).is_err());
    }

    #[test]
    fn test_identity_rejects_blank_email() {
        assert!(Identity::new(Some("x".to_string()), "  ", vec![Role::Artist]).is_err());
    }

    #[test]
    fn test_current_user_anonymous_is_null() {
        assert_eq!(serde_json::to_string(&CurrentUser::Anonymous).unwrap(), "null");
        let user: CurrentUser = serde_json::from_str("null").unwrap();
        assert!(!user.is_authenticated());
    }

    #[test]
    fn test_role_set_describe() {
        let roles: RoleSet = vec![Role::Developer, Role::Artist].into_iter().collect();
        assert_eq!(roles.describe(), "artist, developer");
    }
}

//! Signup wire types and response decoding.
//!
//! The request body is `{"params": {email, password, passwordConf, roles}}`.
//! Responses are decoded exactly once, here, into [`SignupResult`]; nothing
//! downstream looks at raw JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

use studio_common::{Error, Identity, Role};

use crate::error::{ClientError, ClientResult, GENERIC_FAILURE};

/// What the user typed into the signup form
#[derive(Clone, PartialEq, Eq)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub roles: Vec<Role>,
}

impl SignupForm {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            roles: roles.into_iter().collect(),
        }
    }
}

impl fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("roles", &self.roles)
            .finish()
    }
}

/// Parameters sent to the signup endpoint
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupParams {
    pub email: String,
    pub password: String,
    #[serde(rename = "passwordConf")]
    pub password_conf: String,
    pub roles: Vec<Role>,
}

impl fmt::Debug for SignupParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupParams")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("password_conf", &"<redacted>")
            .field("roles", &self.roles)
            .finish()
    }
}

/// Full request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub params: SignupParams,
}

impl SignupRequest {
    /// Build a request from form input. The confirmation always mirrors the
    /// password; the form has no separate confirmation field.
    pub fn from_form(form: &SignupForm) -> studio_common::Result<Self> {
        if form.email.trim().is_empty() {
            return Err(Error::InvalidRequest("Email can't be blank".to_string()));
        }
        if form.password.is_empty() {
            return Err(Error::InvalidRequest("Password can't be blank".to_string()));
        }
        if form.roles.is_empty() {
            return Err(Error::InvalidRequest("Choose at least one role".to_string()));
        }

        Ok(Self {
            params: SignupParams {
                email: form.email.clone(),
                password: form.password.clone(),
                password_conf: form.password.clone(),
                roles: form.roles.clone(),
            },
        })
    }
}

/// Decoded outcome of a signup call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupResult {
    /// Account created; identity as provisioned by the server
    Success(Identity),
    /// Rejected; messages to show the user, never empty
    Failure(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SuccessBody {
    Wrapped { data: Identity },
    Flat(Identity),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<String>),
    One(String),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Deserialize)]
struct MessageList {
    message: OneOrMany,
}

#[derive(Deserialize)]
struct FullMessages {
    full_messages: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FailureBody {
    Messages { messages: MessageList },
    FullMessages { errors: FullMessages },
    ErrorList { errors: Vec<String> },
    Single { message: String },
}

impl FailureBody {
    fn into_messages(self) -> Vec<String> {
        match self {
            FailureBody::Messages { messages } => messages.message.into_vec(),
            FailureBody::FullMessages { errors } => errors.full_messages,
            FailureBody::ErrorList { errors } => errors,
            FailureBody::Single { message } => vec![message],
        }
    }
}

/// Pull the user-facing messages out of a 4xx body.
///
/// Messages are kept exactly as sent. An empty or unreadable body yields one
/// generic message.
pub fn failure_messages(body: &[u8]) -> Vec<String> {
    let messages = serde_json::from_slice::<FailureBody>(body)
        .map(FailureBody::into_messages)
        .unwrap_or_default();

    if messages.is_empty() {
        vec![GENERIC_FAILURE.to_string()]
    } else {
        messages
    }
}

/// Decode a signup response by status class
pub fn decode_response(status: u16, body: &[u8]) -> ClientResult<SignupResult> {
    match status {
        200..=299 => {
            let identity = match serde_json::from_slice::<SuccessBody>(body)? {
                SuccessBody::Wrapped { data } => data,
                SuccessBody::Flat(identity) => identity,
            };
            Ok(SignupResult::Success(identity))
        }
        400..=499 => Ok(SignupResult::Failure(failure_messages(body))),
        _ => Err(ClientError::UnexpectedStatus { status }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn artist_form() -> SignupForm {
        SignupForm::new("user@email.com", "password", vec![Role::Artist])
    }

    #[test]
    fn test_request_mirrors_password() {
        let request = SignupRequest::from_form(&artist_form()).unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["params"]["email"], "user@email.com");
        assert_eq!(json["params"]["password"], "password");
        assert_eq!(json["params"]["passwordConf"], "password");
        assert_eq!(json["params"]["roles"], serde_json::json!(["artist"]));
    }

    #[test]
    fn test_request_sends_email_as_typed() {
        let form = SignupForm::new(" user@email.com ", "password", vec![Role::Artist]);
        let request = SignupRequest::from_form(&form).unwrap();
        assert_eq!(request.params.email, " user@email.com ");
    }

    #[test]
    fn test_request_keeps_role_order() {
        let form = SignupForm::new("a@b.c", "pw", vec![Role::Developer, Role::Artist]);
        let request = SignupRequest::from_form(&form).unwrap();
        assert_eq!(request.params.roles, vec![Role::Developer, Role::Artist]);
    }

    #[test]
    fn test_request_rejects_missing_fields() {
        let mut form = artist_form();
        form.roles.clear();
        assert!(SignupRequest::from_form(&form).is_err());

        let form = SignupForm::new("   ", "password", vec![Role::Artist]);
        assert!(SignupRequest::from_form(&form).is_err());

        let form = SignupForm::new("user@email.com", "", vec![Role::Artist]);
        assert!(SignupRequest::from_form(&form).is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let request = SignupRequest::from_form(&artist_form()).unwrap();
        let printed = format!("{:?} {:?}", request, artist_form());
        assert!(!printed.contains("\"password\""));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_decode_wrapped_success() {
        let body = br#"{"status":"success","data":{"name":"User","email":"user@email.com","roles":["artist"]}}"#;
        match decode_response(201, body).unwrap() {
            SignupResult::Success(identity) => {
                assert_eq!(identity.email, "user@email.com");
                assert!(identity.has_role(&Role::Artist));
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_flat_success() {
        let body = br#"{"name":null,"email":"dev@email.com","roles":["developer"]}"#;
        let result = decode_response(200, body).unwrap();
        assert!(matches!(result, SignupResult::Success(ref i) if i.has_role(&Role::Developer)));
    }

    #[test]
    fn test_success_without_roles_is_malformed() {
        let body = br#"{"data":{"email":"user@email.com","roles":[]}}"#;
        assert!(matches!(decode_response(201, body), Err(ClientError::Decode(_))));
    }

    #[test_case(400 ; "bad request")]
    #[test_case(404 ; "not found")]
    #[test_case(422 ; "unprocessable")]
    #[test_case(499 ; "end of client range")]
    fn test_decode_failure_messages(status: u16) {
        let body = br#"{"messages":{"message":["Email has been taken."]}}"#;
        assert_eq!(
            decode_response(status, body).unwrap(),
            SignupResult::Failure(vec!["Email has been taken.".to_string()])
        );
    }

    #[test]
    fn test_failure_keeps_blank_messages() {
        let body = br#"{"messages":{"message":["Email has been taken.",""]}}"#;
        assert_eq!(failure_messages(body), vec!["Email has been taken.", ""]);
    }

    #[test]
    fn test_failure_fallback_shapes() {
        assert_eq!(
            failure_messages(br#"{"errors":{"full_messages":["Password is too short"]}}"#),
            vec!["Password is too short"]
        );
        assert_eq!(failure_messages(br#"{"errors":["a","b"]}"#), vec!["a", "b"]);
        assert_eq!(failure_messages(br#"{"message":"Nope"}"#), vec!["Nope"]);
        assert_eq!(
            failure_messages(br#"{"messages":{"message":"Single"}}"#),
            vec!["Single"]
        );
    }

    #[test]
    fn test_unreadable_failure_gets_one_generic_message() {
        assert_eq!(failure_messages(b"<html>"), vec![GENERIC_FAILURE]);
        assert_eq!(failure_messages(br#"{"messages":{"message":[]}}"#), vec![GENERIC_FAILURE]);
    }

    #[test]
    fn test_server_error_is_not_decoded() {
        assert!(matches!(
            decode_response(500, b"{}"),
            Err(ClientError::UnexpectedStatus { status: 500 })
        ));
    }
}

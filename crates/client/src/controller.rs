//! The "create project" flow.
//!
//! ```text
//! Anonymous --submit--> SubmittingSignup --2xx, allowed--> Authorized  (/projects/create)
//!                              |          --2xx, refused--> Denied      (/auth, notice)
//!                              |          --4xx----------> SignupFailed (/auth, queued)
//! SignupFailed --submit--> SubmittingSignup
//! ```
//!
//! An already authenticated session skips all of this and goes straight to
//! the project creation view.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use studio_common::{Error, SessionHandle};

use crate::policy::{Authorization, RolePolicy};
use crate::route::Route;
use crate::signup::{SignupForm, SignupRequest, SignupResult};
use crate::transport::SignupTransport;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    #[default]
    Anonymous,
    SubmittingSignup,
    /// Signed in with a role that may create projects
    Authorized,
    /// Signed in, but the granted roles may not create projects
    Denied,
    SignupFailed,
}

impl ControllerState {
    fn accepts_submission(self) -> bool {
        matches!(self, ControllerState::Anonymous | ControllerState::SignupFailed)
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControllerState::Anonymous => "anonymous",
            ControllerState::SubmittingSignup => "submitting_signup",
            ControllerState::Authorized => "authorized",
            ControllerState::Denied => "denied",
            ControllerState::SignupFailed => "signup_failed",
        };
        f.write_str(name)
    }
}

/// What the user ends up looking at after an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub state: ControllerState,
    pub route: Route,
    /// Text displayed on the current view, if any
    pub notice: Option<String>,
}

impl Outcome {
    pub fn navigated_to_create_project(&self) -> bool {
        self.route == Route::CreateProject
    }
}

/// Signup/authorization controller for one application context
pub struct SignupController<T> {
    session: SessionHandle,
    transport: T,
    policy: RolePolicy,
    state: ControllerState,
    route: Route,
    notice: Option<String>,
    requests_sent: usize,
}

impl<T: SignupTransport> SignupController<T> {
    pub fn new(session: SessionHandle, transport: T, policy: RolePolicy) -> Self {
        Self {
            session,
            transport,
            policy,
            state: ControllerState::Anonymous,
            route: Route::Home,
            notice: None,
            requests_sent: 0,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Number of signup calls issued so far
    pub fn requests_sent(&self) -> usize {
        self.requests_sent
    }

    pub fn outcome(&self) -> Outcome {
        Outcome {
            state: self.state,
            route: self.route,
            notice: self.notice.clone(),
        }
    }

    /// User clicked "create project"
    pub fn on_create_project(&mut self) -> Outcome {
        if self.session.is_authenticated() {
            debug!("Session already authenticated, opening project creation");
            self.state = ControllerState::Authorized;
            self.route = Route::CreateProject;
            self.notice = None;
        } else {
            debug!("Anonymous session, showing signup");
            self.route = Route::Auth;
        }
        self.outcome()
    }

    /// User submitted the signup form.
    ///
    /// Never fails: transport problems and server rejections both end in
    /// [`ControllerState::SignupFailed`] with the reason queued.
    pub async fn submit_signup(&mut self, form: &SignupForm) -> Outcome {
        if !self.state.accepts_submission() || self.session.is_authenticated() {
            let err = Error::InvalidStateTransition {
                from: self.state.to_string(),
                to: ControllerState::SubmittingSignup.to_string(),
            };
            warn!("Ignoring signup submission: {}", err);
            return self.outcome();
        }

        self.route = Route::Auth;

        let request = match SignupRequest::from_form(form) {
            Ok(request) => request,
            Err(e) => {
                debug!("Signup form rejected locally: {}", e);
                return self.fail(vec![e.user_message()]);
            }
        };

        self.state = ControllerState::SubmittingSignup;
        self.notice = None;
        self.requests_sent += 1;
        info!(email = %request.params.email, "Submitting signup");

        let result = match self.transport.submit(&request).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Signup transport failed: {}", e);
                SignupResult::Failure(vec![e.user_message()])
            }
        };

        match result {
            SignupResult::Success(identity) => {
                let roles = identity.roles.clone();
                info!(email = %identity.email, roles = %roles.describe(), "Signup succeeded");
                self.session.set_current_user(identity);

                match self.policy.authorize_project_creation(&roles) {
                    Authorization::Granted => {
                        self.state = ControllerState::Authorized;
                        self.route = Route::CreateProject;
                        self.notice = None;
                    }
                    Authorization::Denied(message) => {
                        info!(roles = %roles.describe(), "Project creation denied");
                        self.state = ControllerState::Denied;
                        self.notice = Some(message);
                    }
                }
                self.outcome()
            }
            SignupResult::Failure(messages) => self.fail(messages),
        }
    }

    fn fail(&mut self, messages: Vec<String>) -> Outcome {
        warn!(count = messages.len(), "Signup failed");
        let notice = messages
            .iter()
            .filter(|m| !m.trim().is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        self.session.append_messages(messages);
        self.state = ControllerState::SignupFailed;
        self.route = Route::Auth;
        self.notice = Some(notice);
        self.outcome()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClientError, ClientResult};
    use crate::policy::DEVELOPER_DENIED;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use studio_common::{ContestedRoles, Identity, PolicyConfig, Role};

    #[derive(Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<ClientResult<SignupResult>>>,
        seen: Mutex<Vec<SignupRequest>>,
    }

    impl ScriptedTransport {
        fn replying(replies: Vec<ClientResult<SignupResult>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SignupTransport for ScriptedTransport {
        async fn submit(&self, request: &SignupRequest) -> ClientResult<SignupResult> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected signup call")
        }
    }

    fn identity(roles: &[Role]) -> Identity {
        Identity::new(Some("User".to_string()), "user@email.com", roles.to_vec()).unwrap()
    }

    fn form(roles: &[Role]) -> SignupForm {
        SignupForm::new("user@email.com", "password", roles.to_vec())
    }

    fn controller(
        transport: Arc<ScriptedTransport>,
    ) -> SignupController<Arc<ScriptedTransport>> {
        SignupController::new(SessionHandle::new(), transport, RolePolicy::default())
    }

    #[tokio::test]
    async fn test_authenticated_session_skips_signup() {
        let transport = ScriptedTransport::replying(vec![]);
        let mut ctl = controller(transport.clone());
        ctl.session()
            .set_current_user(identity(&[Role::Artist, Role::Developer]));

        let first = ctl.on_create_project();
        let second = ctl.on_create_project();

        assert_eq!(first.route, Route::CreateProject);
        assert_eq!(first, second);
        assert_eq!(transport.calls(), 0);
        assert_eq!(ctl.requests_sent(), 0);
    }

    #[tokio::test]
    async fn test_email_is_submitted_untrimmed() {
        let transport =
            ScriptedTransport::replying(vec![Ok(SignupResult::Success(identity(&[Role::Artist])))]);
        let mut ctl = controller(transport.clone());

        let padded = SignupForm::new(" user@email.com ", "password", vec![Role::Artist]);
        ctl.submit_signup(&padded).await;

        assert_eq!(transport.seen.lock().unwrap()[0].params.email, " user@email.com ");
    }

    #[tokio::test]
    async fn test_artist_signup_navigates() {
        let transport =
            ScriptedTransport::replying(vec![Ok(SignupResult::Success(identity(&[Role::Artist])))]);
        let mut ctl = controller(transport.clone());

        assert_eq!(ctl.on_create_project().route, Route::Auth);
        let outcome = ctl.submit_signup(&form(&[Role::Artist])).await;

        assert_eq!(outcome.state, ControllerState::Authorized);
        assert!(outcome.navigated_to_create_project());
        assert!(ctl.session().is_authenticated());

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].params.password_conf, "password");
        assert_eq!(seen[0].params.roles, vec![Role::Artist]);
    }

    #[tokio::test]
    async fn test_developer_signup_is_denied_in_place() {
        let transport = ScriptedTransport::replying(vec![Ok(SignupResult::Success(identity(&[
            Role::Developer,
        ])))]);
        let mut ctl = controller(transport);

        ctl.on_create_project();
        let outcome = ctl.submit_signup(&form(&[Role::Developer])).await;

        assert_eq!(outcome.state, ControllerState::Denied);
        assert_eq!(outcome.route, Route::Auth);
        assert_eq!(outcome.notice.as_deref(), Some(DEVELOPER_DENIED));
        assert!(ctl.session().is_authenticated());
        assert_eq!(ctl.session().message_count(), 0);
    }

    #[tokio::test]
    async fn test_denied_developer_reaches_create_project_on_next_click() {
        let transport = ScriptedTransport::replying(vec![Ok(SignupResult::Success(identity(&[
            Role::Developer,
        ])))]);
        let mut ctl = controller(transport.clone());

        ctl.on_create_project();
        let denied = ctl.submit_signup(&form(&[Role::Developer])).await;
        assert_eq!(denied.state, ControllerState::Denied);

        // The authenticated shortcut does not re-check roles
        let next = ctl.on_create_project();
        assert_eq!(next.route, Route::CreateProject);
        assert_eq!(next.state, ControllerState::Authorized);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_policy_uses_returned_roles_not_requested() {
        let transport = ScriptedTransport::replying(vec![Ok(SignupResult::Success(identity(&[
            Role::Developer,
        ])))]);
        let mut ctl = controller(transport);

        let outcome = ctl.submit_signup(&form(&[Role::Artist])).await;
        assert_eq!(outcome.state, ControllerState::Denied);
    }

    #[tokio::test]
    async fn test_rejected_signup_queues_messages() {
        let transport = ScriptedTransport::replying(vec![Ok(SignupResult::Failure(vec![
            "Email has been taken.".to_string(),
        ]))]);
        let mut ctl = controller(transport);

        ctl.on_create_project();
        let outcome = ctl.submit_signup(&form(&[Role::Artist])).await;

        assert_eq!(outcome.state, ControllerState::SignupFailed);
        assert_eq!(outcome.route, Route::Auth);
        assert_eq!(outcome.notice.as_deref(), Some("Email has been taken."));

        let state = ctl.session().state();
        assert_eq!(state.messages.message, vec!["Email has been taken."]);
        assert!(!state.user.is_authenticated());
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let transport = ScriptedTransport::replying(vec![
            Ok(SignupResult::Failure(vec!["Email has been taken.".to_string()])),
            Ok(SignupResult::Success(identity(&[Role::Artist]))),
        ]);
        let mut ctl = controller(transport.clone());

        ctl.on_create_project();
        ctl.submit_signup(&form(&[Role::Artist])).await;
        let outcome = ctl.submit_signup(&form(&[Role::Artist])).await;

        assert_eq!(outcome.state, ControllerState::Authorized);
        assert_eq!(transport.calls(), 2);
        // Earlier failure stays queued
        assert_eq!(ctl.session().message_count(), 1);
    }

    #[tokio::test]
    async fn test_multiple_messages_all_queued() {
        let transport = ScriptedTransport::replying(vec![Ok(SignupResult::Failure(vec![
            "Email has been taken.".to_string(),
            "Password is too short.".to_string(),
        ]))]);
        let mut ctl = controller(transport);

        let outcome = ctl.submit_signup(&form(&[Role::Artist])).await;
        assert_eq!(ctl.session().message_count(), 2);
        assert_eq!(
            outcome.notice.as_deref(),
            Some("Email has been taken. Password is too short.")
        );
    }

    #[tokio::test]
    async fn test_blank_server_message_still_queued() {
        let body = br#"{"messages":{"message":["Email has been taken.",""]}}"#;
        let reply = crate::signup::decode_response(422, body);
        let transport = ScriptedTransport::replying(vec![reply]);
        let mut ctl = controller(transport);

        let outcome = ctl.submit_signup(&form(&[Role::Artist])).await;

        assert_eq!(ctl.session().message_count(), 2);
        assert_eq!(outcome.notice.as_deref(), Some("Email has been taken."));
    }

    #[tokio::test]
    async fn test_transport_error_becomes_one_message() {
        let transport = ScriptedTransport::replying(vec![Err(ClientError::UnexpectedStatus {
            status: 502,
        })]);
        let mut ctl = controller(transport);

        let outcome = ctl.submit_signup(&form(&[Role::Artist])).await;
        assert_eq!(outcome.state, ControllerState::SignupFailed);
        assert_eq!(ctl.session().message_count(), 1);
        assert!(!ctl.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_invalid_form_never_hits_network() {
        let transport = ScriptedTransport::replying(vec![]);
        let mut ctl = controller(transport.clone());

        let outcome = ctl.submit_signup(&form(&[])).await;
        assert_eq!(outcome.state, ControllerState::SignupFailed);
        assert_eq!(outcome.notice.as_deref(), Some("Choose at least one role"));
        assert_eq!(transport.calls(), 0);
        assert_eq!(ctl.session().message_count(), 1);
    }

    #[tokio::test]
    async fn test_submission_after_success_is_ignored() {
        let transport =
            ScriptedTransport::replying(vec![Ok(SignupResult::Success(identity(&[Role::Artist])))]);
        let mut ctl = controller(transport.clone());

        let first = ctl.submit_signup(&form(&[Role::Artist])).await;
        let second = ctl.submit_signup(&form(&[Role::Artist])).await;

        assert_eq!(first, second);
        assert_eq!(transport.calls(), 1);
    }

    // Mixed artist/developer grants are an unresolved product question; the
    // configured contested-roles setting decides.
    #[tokio::test]
    async fn test_mixed_roles_follow_contested_setting() {
        let mixed = || {
            ScriptedTransport::replying(vec![Ok(SignupResult::Success(identity(&[
                Role::Artist,
                Role::Developer,
            ])))])
        };

        let mut allow = controller(mixed());
        let outcome = allow.submit_signup(&form(&[Role::Artist])).await;
        assert_eq!(outcome.state, ControllerState::Authorized);

        let deny_policy = RolePolicy::from_config(&PolicyConfig {
            contested_roles: ContestedRoles::Deny,
        });
        let mut deny = SignupController::new(SessionHandle::new(), mixed(), deny_policy);
        let outcome = deny.submit_signup(&form(&[Role::Artist])).await;
        assert_eq!(outcome.state, ControllerState::Denied);
    }
}

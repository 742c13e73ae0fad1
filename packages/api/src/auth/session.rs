//! Session state as the UI sees it.

use crate::client::AuthEvent;
use crate::models::UserInfo;

/// Whether a user is signed in. Starts as `Loading` until the first event.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Loading,
    Authenticated(UserInfo),
    Unauthenticated,
}

impl SessionState {
    /// Transition on an auth event.
    pub fn apply(&mut self, event: &AuthEvent) {
        match event {
            AuthEvent::InitialSession(Some(session))
            | AuthEvent::SignedIn(session)
            | AuthEvent::TokenRefreshed(session)
            | AuthEvent::PasswordRecovery(session) => {
                *self = Self::Authenticated(session.user.clone());
            }
            AuthEvent::InitialSession(None) | AuthEvent::SignedOut => {
                *self = Self::Unauthenticated;
            }
            AuthEvent::UserUpdated(user) => {
                if let Self::Authenticated(current) = self {
                    *current = user.clone();
                }
            }
        }
    }

    pub fn user(&self) -> Option<&UserInfo> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Session;
    use uuid::Uuid;

    fn session(email: &str) -> Session {
        Session {
            access_token: "a".into(),
            refresh_token: "r".into(),
            token_type: "bearer".into(),
            expires_in: 3600,
            expires_at: None,
            user: UserInfo::new(Uuid::new_v4(), email),
        }
    }

    #[test]
    fn test_starts_loading_and_settles() {
        let mut state = SessionState::default();
        assert!(state.is_loading());

        state.apply(&AuthEvent::InitialSession(None));
        assert_eq!(state, SessionState::Unauthenticated);

        let s = session("a@example.com");
        state.apply(&AuthEvent::SignedIn(s.clone()));
        assert_eq!(state.user(), Some(&s.user));

        state.apply(&AuthEvent::SignedOut);
        assert!(!state.is_authenticated());
    }

    #[test]
    fn test_user_updated_only_applies_when_signed_in() {
        let mut state = SessionState::Unauthenticated;
        let user = UserInfo::new(Uuid::new_v4(), "a@example.com");
        state.apply(&AuthEvent::UserUpdated(user.clone()));
        assert_eq!(state, SessionState::Unauthenticated);

        let s = session("a@example.com");
        state.apply(&AuthEvent::PasswordRecovery(s.clone()));
        let mut renamed = s.user.clone();
        renamed.email = Some("b@example.com".into());
        state.apply(&AuthEvent::UserUpdated(renamed.clone()));
        assert_eq!(state.user(), Some(&renamed));
    }
}

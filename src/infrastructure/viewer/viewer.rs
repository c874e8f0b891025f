use std::fmt;

use crate::{
    core::UserId,
    error::{AppError, AppResult},
};

/// An authenticated principal as asserted by the upstream auth layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: UserId,
    pub username: Option<String>,
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.username {
            Some(name) => write!(f, "{} (#{})", name, self.id),
            None => write!(f, "#{}", self.id),
        }
    }
}

/// Request-scoped view of who is asking. Carries enough of the request to
/// build a login redirect that returns the viewer where they started.
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub principal: Option<Principal>,
    pub request_id: String,
    pub request_path: String,
    login_url: String,
}

impl ViewerContext {
    pub fn anonymous(request_id: String, request_path: String, login_url: String) -> Self {
        Self {
            principal: None,
            request_id,
            request_path,
            login_url,
        }
    }

    pub fn authenticated(
        principal: Principal,
        request_id: String,
        request_path: String,
        login_url: String,
    ) -> Self {
        Self {
            principal: Some(principal),
            request_id,
            request_path,
            login_url,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.principal.as_ref().map(|p| p.id)
    }

    /// The principal, or a redirect to the login entry point with `next`
    /// pointing back at the current request.
    pub fn require_principal(&self) -> AppResult<&Principal> {
        self.principal.as_ref().ok_or_else(|| AppError::AuthenticationRequired {
            location: self.login_redirect(),
        })
    }

    pub fn login_redirect(&self) -> String {
        // Slashes stay readable in `next`, everything else is percent-encoded.
        let next = urlencoding::encode(&self.request_path).replace("%2F", "/");
        let separator = if self.login_url.contains('?') { '&' } else { '?' };
        format!("{}{}next={}", self.login_url, separator, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anonymous(path: &str) -> ViewerContext {
        ViewerContext::anonymous("req-1".into(), path.into(), "/accounts/login/".into())
    }

    #[test]
    fn test_require_principal_redirects_anonymous() {
        let vc = anonymous("/comments/edit/abc");
        match vc.require_principal() {
            Err(AppError::AuthenticationRequired { location }) => {
                assert_eq!(location, "/accounts/login/?next=/comments/edit/abc");
            }
            other => panic!("expected redirect, got {:?}", other),
        }
    }

    #[test]
    fn test_login_redirect_encodes_query() {
        let vc = anonymous("/sentinel/add_comment/1?x=a b");
        assert_eq!(
            vc.login_redirect(),
            "/accounts/login/?next=/sentinel/add_comment/1%3Fx%3Da%20b"
        );
    }

    #[test]
    fn test_authenticated_exposes_user_id() {
        let vc = ViewerContext::authenticated(
            Principal { id: UserId(7), username: Some("userjohn".into()) },
            "req-2".into(),
            "/".into(),
            "/accounts/login/".into(),
        );
        assert!(vc.is_authenticated());
        assert_eq!(vc.user_id(), Some(UserId(7)));
        assert_eq!(vc.require_principal().unwrap().id, UserId(7));
    }

    #[test]
    fn test_principal_display_prefers_username() {
        let named = Principal { id: UserId(7), username: Some("userjohn".into()) };
        let bare = Principal { id: UserId(8), username: None };
        assert_eq!(named.to_string(), "userjohn (#7)");
        assert_eq!(bare.to_string(), "#8");
    }
}

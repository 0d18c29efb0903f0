//! Identity provider collaborator. Absence of identity means anonymous —
//! the pipeline proceeds either way.

use std::collections::HashSet;

use serde::Serialize;

/// Access plan attached to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Premium,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
        }
    }
}

/// Resolved caller identity.
#[derive(Debug, Clone, Default)]
pub struct Identity {
    pub user_id: Option<String>,
    pub plan: Plan,
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }
}

pub trait IdentityProvider: Send + Sync {
    /// Resolve request credentials into an identity. Never fails — missing
    /// or unknown credentials resolve to anonymous.
    fn identify(&self, user_id: Option<&str>, token: Option<&str>) -> Identity;
}

/// Everyone is anonymous.
pub struct AnonymousIdentity;

impl IdentityProvider for AnonymousIdentity {
    fn identify(&self, user_id: Option<&str>, _token: Option<&str>) -> Identity {
        Identity {
            user_id: user_id.map(str::to_owned),
            plan: Plan::Free,
        }
    }
}

/// Token-list gate: callers presenting a token from `SIBYL_PREMIUM_TOKENS`
/// (comma-separated) get the premium plan.
pub struct EnvTokenIdentity {
    tokens: HashSet<String>,
}

impl EnvTokenIdentity {
    pub fn from_env() -> Self {
        let tokens = std::env::var("SIBYL_PREMIUM_TOKENS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect();
        Self { tokens }
    }

    pub fn with_tokens(tokens: impl IntoIterator<Item = String>) -> Self {
        Self { tokens: tokens.into_iter().collect() }
    }
}

impl IdentityProvider for EnvTokenIdentity {
    fn identify(&self, user_id: Option<&str>, token: Option<&str>) -> Identity {
        let plan = match token {
            Some(t) if self.tokens.contains(t.trim()) => Plan::Premium,
            _ => Plan::Free,
        };
        Identity {
            user_id: user_id.map(str::to_owned),
            plan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_by_default() {
        let id = AnonymousIdentity.identify(None, Some("whatever"));
        assert!(id.is_anonymous());
        assert_eq!(id.plan, Plan::Free);
    }

    #[test]
    fn known_token_grants_premium() {
        let provider = EnvTokenIdentity::with_tokens(["tok-1".to_owned()]);
        assert_eq!(provider.identify(Some("u1"), Some("tok-1")).plan, Plan::Premium);
        assert_eq!(provider.identify(Some("u1"), Some("tok-2")).plan, Plan::Free);
        assert_eq!(provider.identify(Some("u1"), None).plan, Plan::Free);
    }
}

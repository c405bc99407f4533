use crate::tokens::TokenSet;

/// The IP whitelist constraints a namespace places on its routes.
///
/// Each list is independent. `None` means the namespace has no opinion and the
/// corresponding check is skipped; `Some` activates the check even when the
/// list holds nothing useful.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NamespacePolicy {
    /// Every declared token must appear here.
    pub allowed: Option<TokenSet>,

    /// No declared token may appear here.
    pub forbidden: Option<TokenSet>,

    /// Every token here must be declared.
    pub required: Option<TokenSet>,
}

/// The outcome of evaluating a route's whitelist against a [`NamespacePolicy`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Denied { reason: String },
}

// === impl NamespacePolicy ===

impl NamespacePolicy {
    /// Checks the tokens `declared` by a route.
    ///
    /// The allow list is checked first, then the forbidden list, then the
    /// required list. Only the first violation is reported.
    pub fn evaluate(&self, declared: &TokenSet) -> Verdict {
        if let Some(allowed) = &self.allowed {
            if let Some(token) = declared.iter().find(|t| !allowed.contains(t)) {
                return Verdict::unauthorized(token);
            }
        }

        if let Some(forbidden) = &self.forbidden {
            if let Some(token) = declared.iter().find(|t| forbidden.contains(t)) {
                return Verdict::unauthorized(token);
            }
        }

        if let Some(required) = &self.required {
            if let Some(token) = required.iter().find(|t| !declared.contains(t)) {
                return Verdict::Denied {
                    reason: format!("must include {token} in the Route IP whitelist"),
                };
            }
        }

        Verdict::Allowed
    }
}

// === impl Verdict ===

impl Verdict {
    fn unauthorized(token: &str) -> Self {
        Self::Denied {
            reason: format!("not authorized to use {token} in the Route IP whitelist"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::parse_tokens;

    fn tokens<const N: usize>(ts: [&str; N]) -> TokenSet {
        ts.into_iter().collect()
    }

    fn denied(reason: &str) -> Verdict {
        Verdict::Denied {
            reason: reason.to_string(),
        }
    }

    #[test]
    fn no_policy_allows_anything() {
        let policy = NamespacePolicy::default();
        assert_eq!(policy.evaluate(&TokenSet::default()), Verdict::Allowed);
        assert_eq!(
            policy.evaluate(&tokens(["10.0.0.1", "0.0.0.0/0", ""])),
            Verdict::Allowed
        );
    }

    #[test]
    fn allowed_list() {
        let policy = NamespacePolicy {
            allowed: Some(tokens(["10.0.0.1"])),
            ..Default::default()
        };
        assert_eq!(policy.evaluate(&tokens(["10.0.0.1"])), Verdict::Allowed);
        assert_eq!(
            policy.evaluate(&tokens(["10.0.0.2"])),
            denied("not authorized to use 10.0.0.2 in the Route IP whitelist")
        );
    }

    #[test]
    fn allowed_list_reports_first_unlisted_token() {
        let policy = NamespacePolicy {
            allowed: Some(tokens(["10.0.0.1", "10.0.0.2"])),
            ..Default::default()
        };
        assert_eq!(
            policy.evaluate(&tokens(["10.0.0.2", "10.0.0.3", "10.0.0.4"])),
            denied("not authorized to use 10.0.0.3 in the Route IP whitelist")
        );
    }

    #[test]
    fn forbidden_list_reports_first_offender() {
        let policy = NamespacePolicy {
            forbidden: Some(tokens(["10.0.0.1"])),
            ..Default::default()
        };
        assert_eq!(
            policy.evaluate(&tokens(["10.0.0.1", "10.0.0.2"])),
            denied("not authorized to use 10.0.0.1 in the Route IP whitelist")
        );

        let policy = NamespacePolicy {
            forbidden: Some(tokens(["10.0.0.9", "10.0.0.5"])),
            ..Default::default()
        };
        assert_eq!(
            policy.evaluate(&tokens(["10.0.0.1", "10.0.0.5", "10.0.0.9"])),
            denied("not authorized to use 10.0.0.5 in the Route IP whitelist")
        );
    }

    #[test]
    fn empty_forbidden_list_passes() {
        let policy = NamespacePolicy {
            forbidden: Some(TokenSet::default()),
            ..Default::default()
        };
        assert_eq!(policy.evaluate(&tokens(["10.0.0.1"])), Verdict::Allowed);
    }

    #[test]
    fn required_list() {
        let policy = NamespacePolicy {
            required: Some(tokens(["10.0.0.1", "10.0.0.2"])),
            ..Default::default()
        };
        assert_eq!(
            policy.evaluate(&tokens(["10.0.0.1"])),
            denied("must include 10.0.0.2 in the Route IP whitelist")
        );
        assert_eq!(
            policy.evaluate(&tokens(["10.0.0.2", "10.0.0.3", "10.0.0.1"])),
            Verdict::Allowed
        );
    }

    #[test]
    fn empty_required_list_is_vacuous() {
        let policy = NamespacePolicy {
            required: Some(TokenSet::default()),
            ..Default::default()
        };
        assert_eq!(policy.evaluate(&TokenSet::default()), Verdict::Allowed);
    }

    #[test]
    fn empty_required_annotation_requires_an_empty_token() {
        let policy = NamespacePolicy {
            required: parse_tokens(Some("")),
            ..Default::default()
        };
        assert_eq!(
            policy.evaluate(&TokenSet::default()),
            denied("must include  in the Route IP whitelist")
        );
        assert_eq!(policy.evaluate(&TokenSet::split("")), Verdict::Allowed);
    }

    #[test]
    fn empty_allowed_annotation() {
        let policy = NamespacePolicy {
            allowed: parse_tokens(Some("")),
            ..Default::default()
        };
        assert_eq!(policy.evaluate(&TokenSet::default()), Verdict::Allowed);
        assert_eq!(
            policy.evaluate(&tokens(["x"])),
            denied("not authorized to use x in the Route IP whitelist")
        );
    }

    #[test]
    fn allowed_is_checked_before_forbidden_and_required() {
        let policy = NamespacePolicy {
            allowed: Some(tokens(["10.0.0.1"])),
            forbidden: Some(tokens(["10.0.0.1"])),
            required: Some(tokens(["10.0.0.3"])),
        };
        assert_eq!(
            policy.evaluate(&tokens(["10.0.0.2", "10.0.0.1"])),
            denied("not authorized to use 10.0.0.2 in the Route IP whitelist")
        );
        assert_eq!(
            policy.evaluate(&tokens(["10.0.0.1"])),
            denied("not authorized to use 10.0.0.1 in the Route IP whitelist")
        );

        let policy = NamespacePolicy {
            forbidden: None,
            ..policy
        };
        assert_eq!(
            policy.evaluate(&tokens(["10.0.0.1"])),
            denied("must include 10.0.0.3 in the Route IP whitelist")
        );
    }

    #[test]
    fn tokens_are_not_cidr_ranges() {
        let policy = NamespacePolicy {
            allowed: Some(tokens(["10.0.0.0/8"])),
            forbidden: Some(tokens(["192.168.0.0/16"])),
            ..Default::default()
        };
        assert_eq!(
            policy.evaluate(&tokens(["10.1.2.3"])),
            denied("not authorized to use 10.1.2.3 in the Route IP whitelist")
        );

        let policy = NamespacePolicy {
            allowed: None,
            ..policy
        };
        assert_eq!(policy.evaluate(&tokens(["192.168.1.1"])), Verdict::Allowed);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let policy = NamespacePolicy {
            allowed: Some(tokens(["10.0.0.1", "10.0.0.2"])),
            forbidden: Some(tokens(["10.0.0.2"])),
            required: Some(tokens(["10.0.0.1"])),
        };
        let declared = tokens(["10.0.0.1", "10.0.0.2"]);
        let first = policy.evaluate(&declared);
        assert_ne!(first, Verdict::Allowed);
        assert_eq!(first, policy.evaluate(&declared));
    }
}

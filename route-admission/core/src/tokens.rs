use std::fmt;

/// An ordered list of IP/CIDR literals read from a comma-separated annotation.
///
/// Tokens are opaque strings: they are never trimmed, normalized, or
/// deduplicated, and two tokens match only when they are byte-for-byte equal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TokenSet(Vec<String>);

/// Parses an annotation value into a [`TokenSet`].
///
/// An absent annotation stays absent. A present annotation is split on every
/// `,`, so an empty value yields a single empty token and a trailing comma
/// yields a trailing empty token.
pub fn parse_tokens(raw: Option<&str>) -> Option<TokenSet> {
    raw.map(TokenSet::split)
}

// === impl TokenSet ===

impl TokenSet {
    pub fn split(raw: &str) -> Self {
        Self(raw.split(',').map(str::to_string).collect())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|t| t == token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for TokenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for TokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.join(",").fmt(f)
    }
}

//! Classification of mutation rejection text.
//!
//! The platform reports "this registration already exists" only as free
//! text inside `userErrors`, so deciding between a duplicate and a real
//! failure is a heuristic. It lives behind [`ErrorClassifier`] so callers
//! can replace it with a locale- or code-aware one.

/// Verdict for a joined `userErrors` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The resource is already there; treat as success.
    AlreadyPresent,
    Failure,
}

pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, message: &str) -> ErrorClass;
}

impl<F> ErrorClassifier for F
where
    F: Fn(&str) -> ErrorClass + Send + Sync,
{
    fn classify(&self, message: &str) -> ErrorClass {
        self(message)
    }
}

pub const DEFAULT_DUPLICATE_TOKENS: &[&str] = &["already", "exists", "taken", "duplicate"];

/// Matches case-insensitive substrings.
///
/// Known to misfire on messages such as "handle does not exist", which
/// contains `exist` and is a genuine failure. Tokens are matched as given,
/// so `exists` does not match that message but `exist` would.
#[derive(Debug, Clone)]
pub struct TokenClassifier {
    tokens: Vec<String>,
}

impl TokenClassifier {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

impl Default for TokenClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_DUPLICATE_TOKENS)
    }
}

impl ErrorClassifier for TokenClassifier {
    fn classify(&self, message: &str) -> ErrorClass {
        let message = message.to_lowercase();
        if self.tokens.iter().any(|t| message.contains(t.as_str())) {
            ErrorClass::AlreadyPresent
        } else {
            ErrorClass::Failure
        }
    }
}

//! DOMTokenList (classList)
//!
//! Space-separated token set backing `class` attribute manipulation.

use crate::{DomError, DomResult};

/// DOMTokenList for managing space-separated tokens (e.g., classList)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DOMTokenList {
    tokens: Vec<String>,
}

fn validate_token(token: &str) -> DomResult<()> {
    if token.is_empty() {
        return Err(DomError::EmptyToken);
    }
    if token.chars().any(char::is_whitespace) {
        return Err(DomError::InvalidCharacter(token.to_string()));
    }
    Ok(())
}

impl DOMTokenList {
    /// Create empty token list
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from space-separated string, dropping duplicates
    pub fn from_string(s: &str) -> Self {
        let mut list = Self::new();
        for token in s.split_whitespace() {
            if !list.contains(token) {
                list.tokens.push(token.to_string());
            }
        }
        list
    }

    /// Get number of tokens
    pub fn length(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Get token at index
    pub fn item(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(|s| s.as_str())
    }

    /// Check if token exists
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Add token(s). All tokens are validated before any is added.
    pub fn add<S: AsRef<str>>(&mut self, tokens: &[S]) -> DomResult<()> {
        for token in tokens {
            validate_token(token.as_ref())?;
        }
        for token in tokens {
            let token = token.as_ref();
            if !self.contains(token) {
                self.tokens.push(token.to_string());
            }
        }
        Ok(())
    }

    /// Remove token(s). All tokens are validated before any is removed.
    pub fn remove<S: AsRef<str>>(&mut self, tokens: &[S]) -> DomResult<()> {
        for token in tokens {
            validate_token(token.as_ref())?;
        }
        self.tokens
            .retain(|t| !tokens.iter().any(|r| r.as_ref() == t.as_str()));
        Ok(())
    }

    /// Toggle a single token, returns new state
    pub fn toggle(&mut self, token: &str, force: Option<bool>) -> DomResult<bool> {
        validate_token(token)?;
        let present = self.contains(token);
        let want = force.unwrap_or(!present);
        if want && !present {
            self.tokens.push(token.to_string());
        } else if !want && present {
            self.tokens.retain(|t| t != token);
        }
        Ok(want)
    }

    /// Replace token, returns whether the old token was present
    pub fn replace(&mut self, old_token: &str, new_token: &str) -> DomResult<bool> {
        validate_token(old_token)?;
        validate_token(new_token)?;
        let Some(pos) = self.tokens.iter().position(|t| t == old_token) else {
            return Ok(false);
        };
        if self.contains(new_token) {
            self.tokens.remove(pos);
        } else {
            self.tokens[pos] = new_token.to_string();
        }
        Ok(true)
    }

    /// Get value as string
    pub fn value(&self) -> String {
        self.tokens.join(" ")
    }

    /// Iterate over tokens
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|s| s.as_str())
    }
}

impl std::fmt::Display for DOMTokenList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

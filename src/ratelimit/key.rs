//! Rate limit key derivation.

/// A key that scopes a rate budget.
///
/// Group chats get one budget per group; every other context shares the
/// single `global` budget.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey(String);

impl RateLimitKey {
    /// Key for a chat group.
    pub fn group(group_id: i64) -> Self {
        Self(format!("group:{}", group_id))
    }

    /// The shared key used outside of groups.
    pub fn global() -> Self {
        Self("global".to_string())
    }

    /// Key for a message that may or may not come from a group.
    pub fn for_scope(group_id: Option<i64>) -> Self {
        match group_id {
            Some(id) => Self::group(id),
            None => Self::global(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RateLimitKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_key() {
        assert_eq!(RateLimitKey::group(123456).as_str(), "group:123456");
    }

    #[test]
    fn test_global_key() {
        assert_eq!(RateLimitKey::global().to_string(), "global");
    }

    #[test]
    fn test_for_scope() {
        assert_eq!(RateLimitKey::for_scope(Some(7)), RateLimitKey::group(7));
        assert_eq!(RateLimitKey::for_scope(None), RateLimitKey::global());
    }
}

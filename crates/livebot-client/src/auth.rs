//! Authentication state shared by outbound calls.
//!
//! The credentials used for API calls live in an [`AuthContext`]. Exactly one
//! component writes it (the installation manager, after a token exchange or
//! bot creation); every outbound call reads it. Updates replace the whole
//! [`AuthHeaders`] value atomically, so a concurrent reader sees either the
//! old headers or the new ones, never a mix.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

/// Header carrying the bearer token.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Header identifying which agent performs the action.
pub const AUTHOR_ID_HEADER: &str = "X-Author-Id";

/// Content type header.
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// Credentials attached to authenticated calls.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    access_token: String,
    author_id: Option<String>,
}

impl AuthHeaders {
    /// Headers carrying only a bearer token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            author_id: None,
        }
    }

    /// Adds the agent id sent as `X-Author-Id`.
    pub fn with_author_id(mut self, author_id: impl Into<String>) -> Self {
        self.author_id = Some(author_id.into());
        self
    }

    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Value of the `X-Author-Id` header, if set.
    pub fn author_id(&self) -> Option<&str> {
        self.author_id.as_deref()
    }

    /// Renders the full header set for a JSON request.
    pub fn to_header_list(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            (AUTHORIZATION_HEADER, self.authorization()),
            (CONTENT_TYPE_HEADER, "application/json".to_string()),
        ];
        if let Some(author_id) = &self.author_id {
            headers.push((AUTHOR_ID_HEADER, author_id.clone()));
        }
        headers
    }
}

impl std::fmt::Debug for AuthHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthHeaders")
            .field("access_token", &"<redacted>")
            .field("author_id", &self.author_id)
            .finish()
    }
}

/// Swappable holder of the current [`AuthHeaders`].
pub struct AuthContext {
    current: ArcSwapOption<AuthHeaders>,
}

impl AuthContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
        }
    }

    /// Creates a context already holding `headers`.
    pub fn with_headers(headers: AuthHeaders) -> Self {
        let ctx = Self::new();
        ctx.replace(headers);
        ctx
    }

    /// Returns the current headers.
    pub fn snapshot(&self) -> Option<Arc<AuthHeaders>> {
        self.current.load_full()
    }

    /// Whether any credentials are present.
    pub fn is_authenticated(&self) -> bool {
        self.current.load().is_some()
    }

    /// Replaces the current headers.
    pub fn replace(&self, headers: AuthHeaders) {
        self.current.store(Some(Arc::new(headers)));
    }

    /// Drops all credentials.
    pub fn clear(&self) {
        self.current.store(None);
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("current", &self.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_list() {
        let headers = AuthHeaders::new("tok").with_author_id("bot-1");
        let list = headers.to_header_list();
        assert!(list.contains(&(AUTHORIZATION_HEADER, "Bearer tok".to_string())));
        assert!(list.contains(&(AUTHOR_ID_HEADER, "bot-1".to_string())));
        assert!(list.contains(&(CONTENT_TYPE_HEADER, "application/json".to_string())));
    }

    #[test]
    fn test_header_list_without_author() {
        let list = AuthHeaders::new("tok").to_header_list();
        assert!(list.iter().all(|(name, _)| *name != AUTHOR_ID_HEADER));
    }

    #[test]
    fn test_context_replace_and_clear() {
        let ctx = AuthContext::new();
        assert!(!ctx.is_authenticated());

        ctx.replace(AuthHeaders::new("a"));
        assert_eq!(ctx.snapshot().unwrap().authorization(), "Bearer a");

        ctx.replace(AuthHeaders::new("b").with_author_id("bot"));
        let snap = ctx.snapshot().unwrap();
        assert_eq!(snap.authorization(), "Bearer b");
        assert_eq!(snap.author_id(), Some("bot"));

        ctx.clear();
        assert!(ctx.snapshot().is_none());
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let ctx = AuthContext::with_headers(AuthHeaders::new("old").with_author_id("bot-old"));
        let before = ctx.snapshot().unwrap();

        ctx.replace(AuthHeaders::new("new").with_author_id("bot-new"));

        assert_eq!(before.authorization(), "Bearer old");
        assert_eq!(before.author_id(), Some("bot-old"));
    }

    #[test]
    fn test_concurrent_readers_never_see_mixed_headers() {
        let ctx = Arc::new(AuthContext::with_headers(
            AuthHeaders::new("token-0").with_author_id("bot-0"),
        ));

        let writer = {
            let ctx = ctx.clone();
            std::thread::spawn(move || {
                for i in 1..500 {
                    ctx.replace(
                        AuthHeaders::new(format!("token-{i}")).with_author_id(format!("bot-{i}")),
                    );
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let ctx = ctx.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let snap = ctx.snapshot().unwrap();
                        let token = snap.authorization();
                        let n = token.trim_start_matches("Bearer token-");
                        assert_eq!(snap.author_id(), Some(format!("bot-{n}").as_str()));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let headers = AuthHeaders::new("very-secret");
        assert!(!format!("{:?}", headers).contains("very-secret"));
    }
}

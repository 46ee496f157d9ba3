use std::collections::HashSet;
use std::sync::Arc;

use application::TagValueService;

/// Shared state handed to every request handler
pub struct AppState {
    pub values: Arc<TagValueService>,
    /// Accepted `Authorization: Basic <token>` values; `None` leaves the API open
    pub auth_tokens: Option<HashSet<String>>,
}

impl AppState {
    pub fn new(values: Arc<TagValueService>, auth_tokens: Option<HashSet<String>>) -> Self {
        Self {
            values,
            auth_tokens,
        }
    }

    pub fn auth_enabled(&self) -> bool {
        self.auth_tokens.is_some()
    }

    pub fn is_token_accepted(&self, token: &str) -> bool {
        match &self.auth_tokens {
            Some(tokens) => tokens.contains(token),
            None => true,
        }
    }
}

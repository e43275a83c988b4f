//! Token revocation store backing logout.
//!
//! Revocation is process state, not table state: a revoked token only needs to
//! be rejected until it expires on its own. The store is a trait so a shared
//! backing store can replace the in-memory set when running more than one
//! instance.

use std::collections::HashSet;

use parking_lot::RwLock;

/// Revoked-token lookup used by the request auth path.
pub trait SessionStore: Send + Sync {
    /// Mark a token as revoked.
    fn revoke(&self, token: &str);

    /// Whether a token has been revoked.
    fn is_revoked(&self, token: &str) -> bool;
}

/// Process-local revoked-token set.
///
/// Growth control is deliberately coarse: once the set passes `capacity` it is
/// cleared wholesale instead of tracking per-token expiry. A cleared token
/// becomes valid again until its JWT expiry, which is an accepted trade-off at
/// this scale.
pub struct InMemorySessionStore {
    revoked: RwLock<HashSet<String>>,
    capacity: usize,
}

impl InMemorySessionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            revoked: RwLock::new(HashSet::new()),
            capacity,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.revoked.read().len()
    }
}

impl SessionStore for InMemorySessionStore {
    fn revoke(&self, token: &str) {
        let mut revoked = self.revoked.write();
        if revoked.len() >= self.capacity {
            tracing::info!(count = revoked.len(), "Clearing revoked-token cache");
            revoked.clear();
        }
        revoked.insert(token.to_string());
    }

    fn is_revoked(&self, token: &str) -> bool {
        self.revoked.read().contains(token)
    }
}

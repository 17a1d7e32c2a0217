use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Session {
    user_id: Uuid,
    expires_at: OffsetDateTime,
}

impl Session {
    fn is_live(&self, now: OffsetDateTime) -> bool {
        now < self.expires_at
    }
}

/// Server-side session store mapping opaque tokens to user ids.
///
/// Cloning hands out another handle to the same map, so the store can ride
/// in `AppState` and be shared by every in-flight request. Expired entries
/// are dropped lazily on access.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Session>> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Session>> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Issue a fresh opaque token bound to `user_id`.
    pub fn issue(&self, user_id: Uuid) -> String {
        let token = Uuid::new_v4().to_string();
        let session = Session {
            user_id,
            expires_at: OffsetDateTime::now_utc() + self.ttl,
        };
        self.write().insert(token.clone(), session);
        token
    }

    /// Resolve a token to its user id, if the token is live.
    pub fn resolve(&self, token: &str) -> Option<Uuid> {
        let now = OffsetDateTime::now_utc();
        {
            let sessions = self.read();
            match sessions.get(token) {
                Some(session) if session.is_live(now) => return Some(session.user_id),
                Some(_) => {}
                None => return None,
            }
        }
        // Expired: upgrade to a write lock and evict. Re-check under the
        // write lock since another request may have replaced the entry.
        let mut sessions = self.write();
        if let Some(session) = sessions.get(token) {
            if session.is_live(now) {
                return Some(session.user_id);
            }
            sessions.remove(token);
        }
        None
    }

    /// Invalidate a token. Returns whether a live session was removed.
    pub fn revoke(&self, token: &str) -> bool {
        let now = OffsetDateTime::now_utc();
        self.write()
            .remove(token)
            .map(|session| session.is_live(now))
            .unwrap_or(false)
    }
}

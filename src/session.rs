use std::time::{Duration, Instant};

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use dashmap::DashMap;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "sid";

/// Per-user session state. The OAuth `state` nonce is written at the login
/// redirect and cleared at the callback; the access token is read on every
/// authenticated request.
#[derive(Debug)]
pub struct Session {
    pub access_token: Option<String>,
    pub oauth_state: Option<String>,
    pub created_at: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            access_token: None,
            oauth_state: None,
            created_at: Instant::now(),
        }
    }
}

/// Process-wide in-memory session store keyed by the `sid` cookie.
pub struct SessionStore {
    sessions: DashMap<Uuid, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn create(&self) -> Uuid {
        let sid = Uuid::now_v7();
        self.sessions.insert(sid, Session::new());
        sid
    }

    pub fn exists(&self, sid: Uuid) -> bool {
        self.sessions.contains_key(&sid)
    }

    pub fn access_token(&self, sid: Uuid) -> Option<String> {
        self.sessions
            .get(&sid)
            .and_then(|s| s.access_token.clone())
    }

    pub fn set_access_token(&self, sid: Uuid, token: String) {
        if let Some(mut session) = self.sessions.get_mut(&sid) {
            session.access_token = Some(token);
        }
    }

    pub fn set_oauth_state(&self, sid: Uuid, state: String) {
        if let Some(mut session) = self.sessions.get_mut(&sid) {
            session.oauth_state = Some(state);
        }
    }

    /// Read and clear the stored OAuth state nonce.
    pub fn take_oauth_state(&self, sid: Uuid) -> Option<String> {
        self.sessions
            .get_mut(&sid)
            .and_then(|mut s| s.oauth_state.take())
    }

    /// Remove sessions older than the given age.
    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.sessions
            .retain(|_, s| now.duration_since(s.created_at) < max_age);
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The session id carried by the request cookie, if it refers to a live session.
pub fn session_id(store: &SessionStore, jar: &CookieJar) -> Option<Uuid> {
    jar.get(SESSION_COOKIE)
        .and_then(|c| c.value().parse::<Uuid>().ok())
        .filter(|sid| store.exists(*sid))
}

/// The session id from the cookie, or a freshly created session. Returns the
/// jar with the cookie set so the caller can include it in the response.
pub fn session_id_or_create(store: &SessionStore, jar: CookieJar) -> (Uuid, CookieJar) {
    if let Some(sid) = session_id(store, &jar) {
        return (sid, jar);
    }
    let sid = store.create();
    let cookie = Cookie::build((SESSION_COOKIE, sid.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    (sid, jar.add(cookie))
}

//! Session state shared by the Request Gateway and the Realtime Channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use tracing::debug;

/// The only long-lived state the client owns.
///
/// The bearer token is written on a successful login or two-factor
/// verification and read by every later request and socket handshake. The
/// connected flag is written by the realtime channel.
#[derive(Debug, Default)]
pub struct Session {
    token: RwLock<Option<String>>,
    connected: AtomicBool,
}

impl Session {
    /// Create an empty session: no token, not connected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current bearer token, if one has been issued.
    pub fn token(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Store a bearer token. Empty tokens are ignored.
    pub(crate) fn set_token(&self, token: &str) {
        if token.is_empty() {
            return;
        }
        let mut guard = match self.token.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(token.to_string());
        debug!("session: bearer token updated");
    }

    /// Returns `true` while the realtime socket is open.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub(crate) fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }

    /// Clear the connected flag, returning whether it was set.
    pub(crate) fn take_connected(&self) -> bool {
        self.connected.swap(false, Ordering::AcqRel)
    }
}

//! Credential generation for registered clients.

use base64::Engine;
use rand::RngCore;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// How many identifiers are drawn before registration gives up on a collision
pub const MAX_CLIENT_ID_ATTEMPTS: usize = 5;

/// Source of client identifiers, secrets and registration access tokens
pub trait CredentialGenerator: Send + Sync {
    fn client_id(&self) -> String;
    fn client_secret(&self) -> String;
    fn registration_access_token(&self) -> String;
}

fn random_token<const N: usize>() -> String {
    let mut bytes = [0u8; N];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::prelude::BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

/// URL-safe random credentials from the thread-local CSPRNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCredentialGenerator;

impl CredentialGenerator for RandomCredentialGenerator {
    fn client_id(&self) -> String {
        random_token::<32>()
    }

    fn client_secret(&self) -> String {
        random_token::<48>()
    }

    fn registration_access_token(&self) -> String {
        random_token::<32>()
    }
}

/// Deterministic generator for tests.
///
/// Queued client ids are handed out first, then `client-<n>` from a counter
/// shared with secrets and tokens.
#[derive(Debug, Default)]
pub struct FixedSequenceGenerator {
    queued_ids: Mutex<VecDeque<String>>,
    counter: AtomicU64,
}

impl FixedSequenceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queued_ids: Mutex::new(ids.into_iter().map(Into::into).collect()),
            counter: AtomicU64::new(0),
        }
    }

    fn next(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{n}")
    }
}

impl CredentialGenerator for FixedSequenceGenerator {
    fn client_id(&self) -> String {
        let queued = match self.queued_ids.lock() {
            Ok(mut queue) => queue.pop_front(),
            Err(poisoned) => poisoned.into_inner().pop_front(),
        };
        queued.unwrap_or_else(|| self.next("client"))
    }

    fn client_secret(&self) -> String {
        self.next("secret")
    }

    fn registration_access_token(&self) -> String {
        self.next("token")
    }
}

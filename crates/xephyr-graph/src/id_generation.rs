//! Hash-based dependency edge IDs.
//!
//! IDs look like `dep-k3x9a2` and are derived from the edge endpoints, a
//! timestamp and a nonce via SHA-256, base36-encoded. Collisions with IDs
//! already in the project are retried with the next nonce; if every nonce
//! collides the ID grows by one character.

use crate::domain::{EdgeId, NewDependency};
use crate::error::{Error, Result};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Prefix of every generated edge ID
pub const EDGE_ID_PREFIX: &str = "dep";

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;
const MIN_LENGTH: usize = 6;
const MAX_LENGTH: usize = 8;

/// Generates edge IDs that do not collide with a project's existing edges.
pub struct EdgeIdGenerator {
    existing: HashSet<EdgeId>,
}

impl EdgeIdGenerator {
    /// Create a generator that avoids the given IDs.
    pub fn new(existing: impl IntoIterator<Item = EdgeId>) -> Self {
        Self {
            existing: existing.into_iter().collect(),
        }
    }

    /// Generate a fresh ID for `dependency` and reserve it.
    ///
    /// # Errors
    ///
    /// Returns `Error::IdGeneration` if no unique ID is found.
    pub fn generate(&mut self, dependency: &NewDependency) -> Result<EdgeId> {
        let timestamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();

        for length in MIN_LENGTH..=MAX_LENGTH {
            for nonce in 0..MAX_NONCE {
                let id = hash_id(dependency, timestamp, nonce, length);
                if self.existing.insert(id.clone()) {
                    if nonce > 0 {
                        tracing::debug!(nonce, length, "Generated edge ID after collision retries");
                    }
                    return Ok(id);
                }
            }
            tracing::warn!(
                length,
                max_nonce = MAX_NONCE,
                "All nonces collided, increasing edge ID length"
            );
        }

        Err(Error::IdGeneration(format!(
            "no unique edge ID after {} attempts",
            MAX_NONCE as usize * (MAX_LENGTH - MIN_LENGTH + 1)
        )))
    }
}

fn hash_id(dependency: &NewDependency, timestamp: i64, nonce: u32, length: usize) -> EdgeId {
    let content = format!(
        "{}|{}|{}|{}|{}",
        dependency.task_id, dependency.depends_on_task_id, dependency.dependency_type, timestamp, nonce
    );

    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let hash = hasher.finalize();

    EdgeId::new(format!(
        "{EDGE_ID_PREFIX}-{}",
        encode_base36(&hash[..8], length)
    ))
}

/// Encode up to 8 bytes as a fixed-length base36 string.
fn encode_base36(bytes: &[u8], length: usize) -> String {
    let mut n = bytes
        .iter()
        .fold(0u64, |acc, &byte| acc.wrapping_shl(8).wrapping_add(u64::from(byte)));

    let mut digits = Vec::with_capacity(length);
    while digits.len() < length {
        #[allow(clippy::cast_possible_truncation)]
        let digit = (n % 36) as usize;
        digits.push(char::from(BASE36_CHARS[digit]));
        n /= 36;
    }
    digits.iter().rev().collect()
}

//! Fake PKG (FPKG) detection.
//!
//! Homebrew packagers sign with the all-zero passcode. The entry-keys block
//! stores a digest of the first derived key 32 bytes into the block, so a PKG
//! is fake exactly when that digest matches the one derived here.

use sha2::{Digest, Sha256};

/// Passcode used by fake packages.
pub const FAKE_PASSCODE: &[u8; 32] = b"00000000000000000000000000000000";

/// Offset of the key digest inside the entry-keys block.
pub const KEY_DIGEST_OFFSET: u64 = 32;

const CONTENT_ID_FIELD: usize = 48;

fn gen_key(content_id: &str, passcode: &[u8; 32], index: u8) -> [u8; 32] {
    let mut padded = [0u8; CONTENT_ID_FIELD];
    let id = content_id.as_bytes();
    let len = id.len().min(CONTENT_ID_FIELD);
    padded[..len].copy_from_slice(&id[..len]);

    let mut hasher = Sha256::new();
    hasher.update(Sha256::digest([0, 0, 0, index]));
    hasher.update(Sha256::digest(padded));
    hasher.update(passcode);
    hasher.finalize().into()
}

/// Returns the key digest a fake package with `content_id` carries.
#[must_use]
pub fn fake_key_digest(content_id: &str) -> [u8; 32] {
    let key = gen_key(content_id, FAKE_PASSCODE, 0);
    let digest = Sha256::digest(key);

    let mut out = [0u8; 32];
    for (o, (k, d)) in out.iter_mut().zip(key.iter().zip(digest.iter())) {
        *o = k ^ d;
    }
    out
}

/// Returns `true` if `stored` is the digest of the fake passcode's key.
#[must_use]
pub fn is_fake(content_id: &str, stored: &[u8; 32]) -> bool {
    fake_key_digest(content_id) == *stored
}

//! Keyed question-name rewriting.
//!
//! A replayed query should still reach the right TLD authority, so the
//! rightmost label is kept; everything left of it is replaced by
//! `ymmv.<hash>` where the hash is keyed with a per-process secret, so a
//! downstream observer cannot recover the end-user labels.

use hickory_proto::rr::Name;
use rand::rngs::OsRng;
use rand::RngCore;
use rootdiff_domain::ReplayError;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

pub const SECRET_LEN: usize = 8;

/// Hex characters of the digest kept in the rewritten label.
const HASH_LABEL_LEN: usize = 16;

pub struct Obfuscator {
    secret: [u8; SECRET_LEN],
}

impl Obfuscator {
    pub fn new(secret: [u8; SECRET_LEN]) -> Self {
        Self { secret }
    }

    /// Build from the 16-hex-character secret given on the command line.
    pub fn from_hex(hex_secret: &str) -> Result<Self, ReplayError> {
        let bytes = hex::decode(hex_secret)
            .map_err(|e| ReplayError::Config(format!("invalid obfuscation secret: {e}")))?;
        let secret: [u8; SECRET_LEN] = bytes.as_slice().try_into().map_err(|_| {
            ReplayError::Config(format!(
                "obfuscation secret must be {SECRET_LEN} bytes ({} hex characters)",
                SECRET_LEN * 2
            ))
        })?;
        info!("using obfuscation secret {}", hex::encode_upper(secret));
        Ok(Self::new(secret))
    }

    /// Generate a fresh secret from the OS RNG. The secret is logged once so
    /// a later run can reproduce the same rewritten names.
    pub fn random() -> Result<Self, ReplayError> {
        let mut secret = [0u8; SECRET_LEN];
        OsRng.try_fill_bytes(&mut secret).map_err(|e| {
            ReplayError::Config(format!("generating random obfuscation secret: {e}"))
        })?;
        info!(
            "generated random obfuscation secret {}",
            hex::encode_upper(secret)
        );
        Ok(Self::new(secret))
    }

    /// Rewrite a question name, preserving the TLD.
    ///
    /// Names with fewer than two labels (root, bare TLD) come back
    /// lowercased and fully qualified but otherwise unchanged.
    pub fn obfuscate_name(&self, qname: &Name) -> Result<Name, ReplayError> {
        let rewritten = self.obfuscate_str(&qname.to_utf8());
        let name = Name::from_utf8(&rewritten).map_err(|e| {
            ReplayError::Protocol(format!("rewritten name '{rewritten}' rejected: {e}"))
        })?;
        debug!(original = %qname, rewritten = %name, "obfuscated question name");
        Ok(name)
    }

    fn obfuscate_str(&self, qname: &str) -> String {
        let labels: Vec<&str> = qname.split('.').filter(|l| !l.is_empty()).collect();

        if labels.len() < 2 {
            let mut out = labels.join(".").to_ascii_lowercase();
            out.push('.');
            return out;
        }

        let lowered = labels.join(".").to_ascii_lowercase();
        let mut hasher = Sha256::new();
        hasher.update(self.secret);
        hasher.update(lowered.as_bytes());
        let digest = hasher.finalize();

        let tld = labels[labels.len() - 1].to_ascii_lowercase();
        format!(
            "ymmv.{}.{}.",
            hex::encode(&digest[..HASH_LABEL_LEN / 2]),
            tld
        )
    }
}

use anyhow::{Result, anyhow};
use ed25519_dalek::{Signature, Signer as DalekSigner, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Signing input prefix. Keeps portal approvals from being replayable as
/// arbitrary chain transactions.
const MESSAGE_DOMAIN_TAG: &[u8] = b"gifportal:v1:";

/// Ed25519 keypair backing the in-process wallet provider.
///
/// Real deployments delegate key custody to an external provider; this type
/// exists so the CLI front-end and the test suites have a wallet to talk to.
pub struct LocalKeypair {
    signing_key: SigningKey,
}

impl LocalKeypair {
    pub fn generate() -> Self {
        let mut rng = OsRng;
        Self {
            signing_key: SigningKey::generate(&mut rng),
        }
    }

    pub fn from_secret_key_bytes(secret_key: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&secret_key),
        }
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// The address the provider reports on connect: hex of the public key,
    /// since the chain account is addressed by public key.
    pub fn wallet_address(&self) -> String {
        to_hex(&self.public_key_bytes())
    }

    pub fn secret_key_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }

    pub fn sign_message(&self, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.is_empty() {
            return Err(anyhow!("payload cannot be empty"));
        }

        let signature: Signature = self.signing_key.sign(&domain_tagged(payload));
        Ok(signature.to_bytes().to_vec())
    }
}

/// Checks a signature produced by `sign_message` against a public key.
pub fn verify_message(public_key: &[u8; 32], payload: &[u8], signature: &[u8]) -> Result<bool> {
    let verifying_key =
        VerifyingKey::from_bytes(public_key).map_err(|err| anyhow!("invalid public key: {err}"))?;
    let signature = Signature::from_slice(signature)
        .map_err(|err| anyhow!("invalid signature encoding: {err}"))?;

    Ok(verifying_key
        .verify(&domain_tagged(payload), &signature)
        .is_ok())
}

/// Content fingerprint used by programs that deduplicate or log appended
/// payloads without retaining them.
pub fn payload_digest(payload: &[u8]) -> String {
    let digest = Sha256::digest(payload);
    to_hex(&digest)
}

fn domain_tagged(payload: &[u8]) -> Vec<u8> {
    let mut input = Vec::with_capacity(MESSAGE_DOMAIN_TAG.len() + payload.len());
    input.extend_from_slice(MESSAGE_DOMAIN_TAG);
    input.extend_from_slice(payload);
    input
}

pub fn to_hex(input: &[u8]) -> String {
    let mut output = String::with_capacity(input.len() * 2);
    for byte in input {
        output.push_str(&format!("{byte:02x}"));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_is_stable_for_a_key() {
        let keypair = LocalKeypair::generate();
        let restored = LocalKeypair::from_secret_key_bytes(*keypair.secret_key_bytes());
        assert_eq!(keypair.wallet_address(), restored.wallet_address());
        assert_eq!(keypair.wallet_address().len(), 64);
    }

    #[test]
    fn signatures_verify_under_the_domain_tag() {
        let keypair = LocalKeypair::generate();
        let signature = keypair.sign_message(b"https://x/y.gif").expect("signable");

        assert!(
            verify_message(&keypair.public_key_bytes(), b"https://x/y.gif", &signature).unwrap()
        );
        assert!(
            !verify_message(&keypair.public_key_bytes(), b"https://x/z.gif", &signature).unwrap()
        );
    }

    #[test]
    fn empty_payload_is_rejected() {
        let keypair = LocalKeypair::generate();
        assert!(keypair.sign_message(b"").is_err());
    }
}

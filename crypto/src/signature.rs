use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::Signature as EcdsaSignature;
use serde::{Deserialize, Serialize};

use crate::{PublicKey, SecretKey};

/// An ECDSA signature carried as the hex encodings of the `r` and `s`
/// scalars, matching the wire layout of operation records
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    /// Hex encoding of the 32-byte `r` scalar
    pub r: String,
    /// Hex encoding of the 32-byte `s` scalar
    pub s: String,
}

impl Signature {
    /// Signs the given message bytes
    pub fn sign(secret_key: &SecretKey, message: &[u8]) -> Self {
        let signature: EcdsaSignature = secret_key.sign(message);
        let bytes = signature.to_bytes();
        let bytes = bytes.as_slice();
        Signature {
            r: hex::encode(&bytes[..32]),
            s: hex::encode(&bytes[32..]),
        }
    }

    /// Verifies this signature over the given message under `public_key`
    ///
    /// Malformed scalar encodings verify as false rather than erroring, as a
    /// signature that cannot be decoded cannot have been produced by signing
    pub fn verify(&self, public_key: &PublicKey, message: &[u8]) -> bool {
        let decoded = (hex::decode(&self.r), hex::decode(&self.s));
        let buf = match decoded {
            (Ok(r), Ok(s)) if r.len() == 32 && s.len() == 32 => {
                let mut buf = [0u8; 64];
                buf[..32].copy_from_slice(&r);
                buf[32..].copy_from_slice(&s);
                buf
            }
            _ => return false,
        };

        match EcdsaSignature::from_slice(&buf) {
            Ok(signature) => public_key
                .as_verifying_key()
                .verify(message, &signature)
                .is_ok(),
            Err(_) => false,
        }
    }
}

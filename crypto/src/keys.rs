use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use p256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// An ECDSA P-256 signing key
pub type SecretKey = SigningKey;

/// An ECDSA P-256 verifying key
///
/// Serialized as the hex encoding of the uncompressed SEC1 point so that the
/// canonical JSON of records carrying a key is identical on every peer.
/// Equality is by curve point, never by object identity
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// The underlying verifying key
    pub fn as_verifying_key(&self) -> &VerifyingKey {
        &self.0
    }

    /// Hex encoding of the uncompressed SEC1 point
    pub fn to_sec1_hex(&self) -> String {
        hex::encode(self.0.to_encoded_point(false).as_bytes())
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(key: VerifyingKey) -> Self {
        PublicKey(key)
    }
}

impl TryFrom<&str> for PublicKey {
    type Error = Error;

    fn try_from(data: &str) -> Result<Self, Error> {
        let bytes = hex::decode(data)?;
        VerifyingKey::from_sec1_bytes(&bytes)
            .map(PublicKey)
            .map_err(|_| Error::InvalidKey)
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_sec1_hex())
    }
}

impl std::hash::Hash for PublicKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_encoded_point(false).as_bytes().hash(state);
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_sec1_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl<'de> Visitor<'de> for KeyVisitor {
            type Value = PublicKey;

            fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str("a hex encoded SEC1 public key")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<PublicKey, E> {
                PublicKey::try_from(value).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(KeyVisitor)
    }
}

/// A P-256 key pair
#[derive(Clone)]
pub struct KeyPair {
    /// The signing half
    pub secret_key: SecretKey,
    /// The verifying half, derived from the signing half
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generates a fresh random key pair
    pub fn generate() -> Self {
        Self::from(SigningKey::random(&mut OsRng))
    }

    /// Hex encoding of the secret scalar, the inverse of `try_from`
    pub fn secret_hex(&self) -> String {
        hex::encode(self.secret_key.to_bytes())
    }
}

impl From<SigningKey> for KeyPair {
    fn from(secret_key: SigningKey) -> Self {
        let public_key = PublicKey(VerifyingKey::from(&secret_key));
        KeyPair {
            secret_key,
            public_key,
        }
    }
}

impl TryFrom<&str> for KeyPair {
    type Error = Error;

    fn try_from(data: &str) -> Result<Self, Error> {
        let bytes = hex::decode(data)?;
        let secret_key = SigningKey::from_slice(&bytes).map_err(|_| Error::InvalidKey)?;
        Ok(Self::from(secret_key))
    }
}

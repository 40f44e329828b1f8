use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use digest::Digest;
use md5::Md5;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Raw bytes of an MD5 digest
pub type Hash128Data = [u8; 16];

/// An MD5 digest, rendered everywhere as 32 lowercase hex characters
///
/// Block and operation identity on the wire is this hex rendering, so the
/// type serializes as a string rather than a byte sequence
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Hash128(Hash128Data);

impl Hash128 {
    /// The all-zero hash
    pub fn null_hash() -> Self {
        Hash128([0; 16])
    }

    /// Hashes the given bytes with MD5
    pub fn digest(bytes: &[u8]) -> Self {
        let mut data = [0; 16];
        data.copy_from_slice(&Md5::digest(bytes));
        Hash128(data)
    }

    /// The raw digest bytes
    pub fn data(&self) -> &Hash128Data {
        &self.0
    }
}

impl Display for Hash128 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<Hash128Data> for Hash128 {
    fn from(data: Hash128Data) -> Self {
        Hash128(data)
    }
}

impl TryFrom<&str> for Hash128 {
    type Error = hex::FromHexError;

    fn try_from(data: &str) -> Result<Self, Self::Error> {
        if data.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut buf = [0; 16];
        hex::decode_to_slice(data, &mut buf)?;
        Ok(Hash128(buf))
    }
}

impl Serialize for Hash128 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash128 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HexVisitor;

        impl<'de> Visitor<'de> for HexVisitor {
            type Value = Hash128;

            fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str("a 32 character hex string")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Hash128, E> {
                Hash128::try_from(value).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(HexVisitor)
    }
}

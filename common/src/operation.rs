use serde::{Deserialize, Serialize};

use crypto::{KeyPair, PublicKey, Signature};

use crate::GetHash;

/// A signed drawing operation
///
/// `op` is a full `<path .../>` SVG fragment for creates, or the same
/// fragment prefixed with `delete ` for deletions. The signature covers the
/// UTF-8 bytes of `op` under the author's private key
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpRecord {
    /// The operation text
    pub op: String,

    /// Ink cost for creates, ink refund for deletes
    pub ink_used: u32,

    /// Hex encoding of the signature's `r` scalar
    pub op_sig_r: String,

    /// Hex encoding of the signature's `s` scalar
    pub op_sig_s: String,

    /// The author's public key
    pub author_pub_key: PublicKey,
}

impl OpRecord {
    /// Builds a record for `op`, signed with the author's key pair
    pub fn signed(op: String, ink_used: u32, keypair: &KeyPair) -> Self {
        let signature = Signature::sign(&keypair.secret_key, op.as_bytes());
        OpRecord {
            op,
            ink_used,
            op_sig_r: signature.r,
            op_sig_s: signature.s,
            author_pub_key: keypair.public_key,
        }
    }

    /// Whether the carried signature verifies under `author_pub_key`
    pub fn verify_signature(&self) -> bool {
        let signature = Signature {
            r: self.op_sig_r.clone(),
            s: self.op_sig_s.clone(),
        };
        signature.verify(&self.author_pub_key, self.op.as_bytes())
    }

    /// Whether this operation deletes a previously created shape
    pub fn is_delete(&self) -> bool {
        self.op
            .split_whitespace()
            .next()
            .map(|word| word.eq_ignore_ascii_case("delete"))
            .unwrap_or(false)
    }

    /// The full `<path .../>` fragment a deletion removes, if this is a
    /// deletion
    ///
    /// This is the exact text of the create being undone; matching on it
    /// keeps a delete from touching another shape that merely shares the
    /// same path data
    pub fn delete_target(&self) -> Option<&str> {
        if !self.is_delete() {
            return None;
        }
        self.op
            .split_once(char::is_whitespace)
            .map(|(_, fragment)| fragment.trim_start())
    }

    /// The `d` attribute of the operation's path fragment, if present
    ///
    /// Deletions embed the full fragment of the shape they remove, so this
    /// returns the deleted shape's path for those as well
    pub fn path_d(&self) -> Option<&str> {
        let start = self.op.find("d=\"")? + 3;
        let rest = &self.op[start..];
        Some(&rest[..rest.find('"')?])
    }
}

impl GetHash for OpRecord {
    fn get_hash_blob(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("operation record serialization cannot fail")
    }
}

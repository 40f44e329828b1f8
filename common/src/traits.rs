use crypto::Hash128;

/// Gets the MD5 hash of an implementor's canonical JSON serialization
///
/// The canonical form is the field-order-stable JSON encoding of the
/// implementor. Every peer must produce identical bytes for an identical
/// value, as the hash is the value's network-wide identity
pub trait GetHash {
    /// Gets the canonical JSON bytes of the implementor ready for hashing
    fn get_hash_blob(&self) -> Vec<u8>;

    /// Gets the hash of the implementor
    ///
    /// This hash serves as the ID of the implementor across the network
    fn get_hash(&self) -> Hash128 {
        Hash128::digest(&self.get_hash_blob())
    }
}

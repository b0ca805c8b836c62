//! The fixed base address of a storage item.
use skey_types::BasePrefix;

pub const BASE_PREFIX_LEN: usize = 32;

/// Returns `twox128(prefix) ++ twox128(method)`.
///
/// The item's own hashers play no part here.
pub fn base_prefix(
    prefix: &str,
    method: &str,
) -> BasePrefix {
    let prefix_hash = sp_core_hashing::twox_128(prefix.as_bytes());
    let method_hash = sp_core_hashing::twox_128(method.as_bytes());

    let mut base = [0u8; BASE_PREFIX_LEN];
    base[..16].copy_from_slice(&prefix_hash);
    base[16..].copy_from_slice(&method_hash);
    base
}

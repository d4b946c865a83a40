//! IBX1 file signature and frame constants.

/// The magic bytes at the start of an IBX1 file.
pub const MAGIC: &[u8; 4] = b"IBX1";

/// Size of the magic bytes.
pub const MAGIC_LEN: usize = 4;

/// The encoding flag written between the value table and the root node.
///
/// Readers accept any value here; writers always emit this one.
pub const ENCODING_FLAG: u8 = 0x01;

/// Check if data starts with the IBX1 signature.
pub fn is_ibx(data: &[u8]) -> bool {
    data.len() >= MAGIC_LEN && &data[..MAGIC_LEN] == MAGIC
}

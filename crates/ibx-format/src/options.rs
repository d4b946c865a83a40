//! Conversion options.

/// How typed values are rendered as text.
///
/// Each flag switches one integer width from decimal to zero-padded
/// hexadecimal (`0xFF`, `0x00FF`, `0x000000FF`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Render 8-bit integers as hex.
    pub hex8: bool,
    /// Render 16-bit integers as hex.
    pub hex16: bool,
    /// Render 32-bit integers as hex.
    pub hex32: bool,
}

/// How a document is built from an element tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Share one typed-value entry between properties with the same type
    /// and text. Disabling this gives every property its own entry, which
    /// makes the output larger.
    pub share_values: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { share_values: true }
    }
}

/// Temp-then-rename publishing of output files.
pub mod atomic;
/// Frame indices, rates, sizes and colors.
pub mod core;
/// Error type and stage tagging.
pub mod error;

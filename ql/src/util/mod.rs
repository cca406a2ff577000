pub mod format;
pub mod immutable;
pub mod log;

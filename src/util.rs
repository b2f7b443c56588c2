//! Shared utility modules used across marquee components.

pub mod cancel;
pub mod varint;

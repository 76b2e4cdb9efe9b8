//! Read entities definitions.

pub mod property;

//! Concrete provider adapters.

pub mod anthropic;

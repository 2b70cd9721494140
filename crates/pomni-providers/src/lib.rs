//! # pomni-providers
//!
//! Answer engine implementations for Pomni.

pub mod openai;
pub mod openrouter;

//! # pomni-channels
//!
//! Messaging platform integrations for Pomni.

pub mod telegram;
pub(crate) mod utils;
pub mod whisper;

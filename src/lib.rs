// src/lib.rs
// Pinchat - chat with pinned PDFs using OpenAI and Pinata

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod error;
pub mod extract;
pub mod openai;
pub mod pinata;
pub mod retry;
pub mod session;
pub mod store;
pub mod web;
pub use error::{PinchatError, Result};

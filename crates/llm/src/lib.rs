//! Generative model provider adapters.
//!
//! Implements the [`pipeline::LlmProvider`] trait for Google's Generative
//! Language API ([`GeminiProvider`]). Additional providers are added as new
//! modules in this crate without any changes to the `pipeline` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request formatting, response parsing,
//! and refusal classification live here. The [`pipeline`] crate sees only
//! [`pipeline::LlmProvider`] and [`pipeline::LlmError`].

pub mod gemini;

pub use gemini::{GeminiConfig, GeminiProvider, DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL};

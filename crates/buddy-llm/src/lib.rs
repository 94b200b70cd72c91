//! OpenAI-compatible chat client for Gemini.
//!
//! Gemini exposes an OpenAI-compatible endpoint, so the client is built on
//! async-openai with a custom API base. Supports plain chat and tool calling.

mod client;
mod discover;

pub use client::{ChatResponse, LlmClient, LlmMetrics, LlmResponse};
pub use discover::list_models;

/// Gemini's OpenAI-compatible API base.
pub const GEMINI_OPENAI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

//! LLM provider abstraction for sibyl.
//!
//! `provider` defines the completion contract and a mock for tests;
//! `http` implements it over OpenAI-compatible and Anthropic APIs.

pub mod http;
pub mod provider;

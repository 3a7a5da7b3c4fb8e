// Optimization Request Client
// Implements: validation, result cache, prompts, response parsing, pipeline.
// All LLM calls go through llm_client; no direct provider calls here.

pub mod cache;
pub mod error;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod prompts;
pub mod service;
pub mod validator;

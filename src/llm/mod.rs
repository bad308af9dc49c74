//! Reasoning-service plumbing: the service seam, structured decoding,
//! prompt context and the HTTP client.

pub mod client;
pub mod context;
pub mod parser;
pub mod service;

pub use client::LlmClient;
pub use context::TurnContext;
pub use parser::{decode_structured, extract_json};
pub use service::{generate_structured, generate_text, Prompt, ReasoningService, ResponseSchema};

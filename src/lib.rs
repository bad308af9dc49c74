//! Agent Arena - reasoning-driven turn-based duels

pub mod battle;
pub mod core;
pub mod entity;
pub mod llm;

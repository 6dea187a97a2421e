//! The context-accumulation, memory, and learning pipeline.

pub mod ai;
pub mod analyzer;
pub mod config;
pub mod context;
pub mod generator;
pub mod learning;
pub mod memory;
pub mod orchestrator;
pub mod prompts;

// src/lib.rs
pub mod cli;
pub mod core;
pub mod docx;
pub mod generator;
pub mod types;
pub mod utils;
pub mod web;

pub use crate::core::{ConfigManager, Database, GeminiClient, GenerationGate, PromptEngine};
pub use crate::generator::{GenerationResult, LetterGenerator};
pub use crate::types::{GenerationKind, JobApplication};
pub use crate::web::start_web_server;

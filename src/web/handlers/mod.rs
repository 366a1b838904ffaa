// src/web/handlers/mod.rs
pub mod export_handlers;
pub mod generate_handlers;
pub mod storage_handlers;
pub mod system_handlers;

pub use export_handlers::*;
pub use generate_handlers::*;
pub use storage_handlers::*;
pub use system_handlers::*;

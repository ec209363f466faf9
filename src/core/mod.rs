//! Core functionality: document model, rendering, persistence and configuration

pub mod color;
pub mod config;
pub mod document;
pub mod error;
pub mod render;
pub mod store;

//! LicitLens - AI analysis core for government tender documents
//!
//! This crate orchestrates two AI providers (OpenAI, Gemini) to analyze
//! pliegos, propuestas y contratos: structured insights, document
//! comparisons, and document-grounded chat, always answering in Spanish.

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;

#![deny(missing_docs)]

//! Core library for the readaloud text-to-speech server.

/// HTTP routing and REST handlers.
pub mod api;
/// Audio segment concatenation.
pub mod assembly;
/// Environment-driven configuration management.
pub mod config;
/// Document text extraction (plain text, PDF, OCR fallback).
pub mod extract;
/// Structured logging and tracing setup.
pub mod logging;
/// Request pipeline: chunking, orchestration, temp-file cleanup.
pub mod pipeline;
/// Remote speech synthesis client.
pub mod synthesis;

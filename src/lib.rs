//! Docx2Pdf Server Library
//!
//! Exposes the conversion pipeline for the server binary, tests and benches.
//!
//! # Modules
//!
//! - `storage`: Upload and output artifacts on the local filesystem
//! - `document`: Format-agnostic document model and pipeline seams
//! - `formats`: DOCX extraction and PDF rendering
//! - `conversion`: Orchestrates one upload into one PDF
//! - `retrieval`: Validated, streamed access to rendered outputs
//! - `routes`: HTTP surface

pub mod config;
pub mod conversion;
pub mod document;
pub mod error;
pub mod formats;
pub mod retrieval;
pub mod routes;
pub mod state;
pub mod storage;

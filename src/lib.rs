//! `sotto` is a streaming speech segmentation and decode orchestration library.
//!
//! This crate turns a continuous raw audio sample stream into time-aligned
//! transcribed text. It provides:
//! - A single-slot, non-blocking hand-off between audio capture and decoding
//! - Voice-activity gating with pluggable denoise/silence filters
//! - Two decode orchestration policies (incremental and batch) sharing one
//!   session shape, chosen at factory time to match the backend's capabilities
//! - Timestamp bookkeeping and subtitle segment assembly across decode calls
//!
//! The acoustic decode itself is delegated to a pluggable [`backend::DecodeBackend`];
//! this crate never performs neural inference.
//!
//! The library is designed to be embedded by both interactive frontends and
//! long-running services, with an emphasis on predictable latency, deterministic
//! cancellation, and minimal surprises.

// High-level API (most consumers should start here).
pub mod engine;
pub mod worker;

// Session configuration and callback surface.
pub mod callbacks;
pub mod opts;
pub mod output_shape;

// Capture hand-off.
pub mod frame;
pub mod sample_buffer;

// Voice-activity gating.
pub mod vad;

// Decode backend contract.
pub mod backend;

// Timestamp bookkeeping and segment assembly.
pub mod accumulator;
pub mod reflow;
pub mod segments;
pub mod timeline;
pub mod token;

// Text collaborators and output encoders.
pub mod json_array_encoder;
pub mod punctuate;
pub mod segment_encoder;
pub mod srt_encoder;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

pub mod error;

pub use error::{Error, Result};

//! # inkforge-core
//!
//! Shared domain types for the inkforge content-generation toolkit.
//!
//! This crate defines the vocabulary the rest of the workspace speaks:
//!
//! - [`Prompt`]: the input handed to a generative model, as ordered text
//!   and inline image parts.
//! - [`GenerationSettings`]: sampling and length controls for a request.
//! - [`Generated`]: the parsed result of a generation call, holding text
//!   and/or inline image parts plus usage metadata.
//!
//! There is deliberately no I/O here; the model boundary lives in
//! `inkforge-gemini` and the call sites in `inkforge-studio`.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod content;
pub mod prompt;
pub mod settings;

pub use content::{FinishReason, Generated, GeneratedPart, InlineImage, Usage};
pub use prompt::{Prompt, PromptPart};
pub use settings::GenerationSettings;

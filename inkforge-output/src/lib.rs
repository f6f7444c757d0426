//! # inkforge-output
//!
//! Structured-output support for the inkforge call sites.
//!
//! Two concerns live here:
//!
//! - [`ResponseSchema`] / [`SchemaBuilder`]: the JSON-shape hint each call
//!   site hands to the model alongside its prompt, serialized in the form
//!   the Generative Language API's `responseSchema` field accepts.
//! - [`extract_json_from_text`] / [`parse_json_from_text`]: pulling JSON
//!   out of model replies that wrap it in markdown fences or prose.
//!
//! ## Example
//!
//! ```rust
//! use inkforge_output::SchemaBuilder;
//!
//! let schema = SchemaBuilder::object()
//!     .string("title", "Working title of the book")
//!     .array_of_strings("keywords", "Search keywords")
//!     .require(["title", "keywords"])
//!     .build();
//! assert_eq!(schema.to_value()["type"], "OBJECT");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod extract;
pub mod schema;

pub use error::OutputParseError;
pub use extract::{extract_json_from_text, looks_like_json, parse_json_from_text};
pub use schema::{ResponseSchema, SchemaBuilder};

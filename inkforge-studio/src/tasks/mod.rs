//! One module per content-generation feature.
//!
//! Each module owns its request/response types, prompt assembly, response
//! schema, and the model list and retry budget for its call site. Handlers
//! stay thin: build a [`TaskSpec`](crate::engine::TaskSpec), hand it to the
//! engine, parse the output.

pub mod analysis;
pub mod characters;
pub mod cover;
pub mod listing;
pub mod panels;
pub mod research;
pub mod story;
pub mod worldbuilding;

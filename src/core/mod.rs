// laratail - core/mod.rs
//
// Core business logic layer: entry model, line parser, severity filter.
// Must NOT depend on: app, platform, or filesystem access.

pub mod filter;
pub mod model;
pub mod parser;

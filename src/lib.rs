// laratail - lib.rs
//
// Library entry point, exposing every layer for integration testing and
// for front-ends other than the bundled console binary.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;

// laratail - platform/mod.rs
//
// Platform abstraction layer: directories, config file, recent-files list,
// and filesystem helpers.
// Dependencies: standard library, directories crate.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
pub mod recent;

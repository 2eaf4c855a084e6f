// laratail - app/mod.rs
//
// Application layer: tail follower, watch session orchestration, and the
// consumer-side entry list.
// Dependencies: core, platform.

pub mod session;
pub mod state;
pub mod tail;

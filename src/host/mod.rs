//! Newline-delimited JSON host bridge.

pub mod contract;
pub mod handler;
pub mod stdio;

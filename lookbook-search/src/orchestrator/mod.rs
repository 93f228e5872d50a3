//! Link pipeline orchestration: aggregate, filter, schedule, validate, render.
//!
//! Each stage lives in its own module and is usable on its own;
//! [`pipeline::LinkPipeline`] wires them together behind the result cache.

pub mod aggregate;
pub mod dedup;
pub mod fallback;
pub mod filter;
pub mod pipeline;
pub mod render;
pub mod schedule;
pub mod validate;

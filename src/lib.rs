pub mod cli;
pub mod config;
pub mod feed;
pub mod model;
pub mod plan;
pub mod snapshot;

mod api;

pub use api::{Ripple, RippleBuilder};

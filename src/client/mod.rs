//! Unified mini app client.

mod builder;
mod micro_app;

pub use builder::MicroAppBuilder;
pub use micro_app::MicroApp;

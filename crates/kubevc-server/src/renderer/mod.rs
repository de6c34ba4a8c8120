//! Renderer adapters

mod command;
mod timeout;

pub use command::CommandRenderer;
pub use timeout::TimeoutRenderer;

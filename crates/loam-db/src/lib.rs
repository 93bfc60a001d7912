mod command;
mod config;
mod error;
mod handler;

pub use command::Command;
pub use config::HandlerConfig;
pub use error::CommandError;
pub use handler::Handler;

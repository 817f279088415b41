mod app_config;
mod browse;
#[cfg(test)]
pub(crate) mod fake;
mod logging;
mod paths;
mod state;
mod tmux;

pub use app_config::*;
pub use browse::*;
pub use logging::*;
pub use paths::*;
pub use state::*;
pub use tmux::*;

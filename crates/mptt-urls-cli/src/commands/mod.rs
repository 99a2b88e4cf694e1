//! Built-in management commands.
//!
//! Each command implements the
//! [`ManagementCommand`](crate::command::ManagementCommand) trait.

pub mod check;
pub mod resolve;
pub mod runserver;

pub use check::CheckCommand;
pub use resolve::ResolveCommand;
pub use runserver::RunserverCommand;

use crate::command::CommandRegistry;

/// Registers all built-in management commands into the given registry.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(CheckCommand));
    registry.register(Box::new(ResolveCommand));
    registry.register(Box::new(RunserverCommand));
}

//! Chat control surface.
//!
//! - [`command`]: parsing of `/command args` messages
//! - [`dispatch`]: executing commands against the loop and settings
//! - [`settings`]: runtime-mutable settings and the task that owns writes

pub mod command;
pub mod dispatch;
pub mod settings;

pub use command::{parse_command, Command};
pub use dispatch::ControlSurface;
pub use settings::{
    spawn_settings_task, RuntimeSettings, SettingsClient, SettingsSnapshot, SettingsUpdate,
};

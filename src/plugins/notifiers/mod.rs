// Notifier plugin implementations
pub mod discord;

pub use discord::{DiscordConfig, DiscordNotifier};

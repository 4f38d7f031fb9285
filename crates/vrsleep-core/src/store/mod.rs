//! JSON-file-backed stores in the application's user-data directory. Each
//! store is opened, read-modify-written, and closed per call; reads fail
//! soft to safe defaults, only credential writes fail loud.

mod message_slots;
mod settings;
mod whitelist;

pub use message_slots::MessageSlotStore;
pub use settings::{Settings, SettingsPatch, SettingsStore};
pub use whitelist::{normalize_entry, WhitelistStore};

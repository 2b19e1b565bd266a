// Configuration loading

pub mod settings;

pub use settings::{Settings, ViewSettings, DEFAULT_API_BASE};

//! Display model plus the views built on it.

pub mod display;
pub mod settings_panel;
pub mod summary;

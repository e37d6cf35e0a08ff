//! UI layer for the studio desktop app: app shell, panels, and overlays.

pub mod app;

pub use app::{StartupConfig, StudioApp};

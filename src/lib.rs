// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod editor;
pub mod errors;
pub mod locale;
pub mod logging;
pub mod menu;
pub mod menu_csv;
pub mod runtime;
pub mod session;
pub mod storage;
pub mod store;
pub mod timer;
pub mod ui;

//! Configuration loading for the reconciliation engine.

mod loader;

pub use loader::{load, load_from_env, load_from_file, probe_config_paths};

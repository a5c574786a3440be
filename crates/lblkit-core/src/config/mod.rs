//! Configuration: environment keys, loading helpers and the schema.

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{load_dotenv, load_dotenv_from_dir, remove_env_var, set_env_var};
pub use schema::{ObservabilityConfig, SetupConfig};

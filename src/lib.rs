pub mod app;
pub mod config;
pub mod errors;
pub mod gating;
pub mod handlers;
pub mod identifier;
pub mod models;
pub mod overlay;
pub mod remote;
pub mod scanner;
pub mod session;
pub mod state;
pub mod storage;
pub mod sync;
pub mod ui;
pub mod week;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::load_preferences;

pub mod api;
pub mod api_doc;
pub mod server;
pub mod state;

pub use server::{build_router, build_state, run_server};
pub use state::AppState;

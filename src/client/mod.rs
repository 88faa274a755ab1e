mod api;
mod error;
mod viewer;
mod watch;

pub use api::ApiClient;
pub use error::ClientError;
pub use viewer::{Frame, Viewer};
pub use watch::{watch, WatchOptions};

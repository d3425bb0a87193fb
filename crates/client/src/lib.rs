pub mod error;
pub mod http;
pub mod traits;

pub use error::ClientError;
pub use http::RestTrackerClient;
pub use traits::TrackerClient;

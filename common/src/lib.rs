//! Live Detect Common Library
//!
//! CLIとWeb(WASM)で共有される型と状態管理

pub mod endpoints;
pub mod error;
pub mod mjpeg;
pub mod ordering;
pub mod state;
pub mod types;

pub use endpoints::{
    Endpoints, DEFAULT_BASE_URL, DEFAULT_STREAM_HEIGHT, DEFAULT_STREAM_WIDTH, POLL_INTERVAL,
};
pub use error::{Error, Result};
pub use mjpeg::{boundary_from_content_type, Frame, MjpegSplitter, DEFAULT_BOUNDARY};
pub use ordering::{ResponseOrdering, SequenceTracker, Supersede, Ticket};
pub use state::{Applied, DashboardState, StreamAlert, UploadStart, STREAM_ALERT_MESSAGE};
pub use types::{DetectionsResponse, ErrorBody, IndexResponse, UploadResponse};

//! 画面コンポーネント

pub mod detection_list;
pub mod header;
pub mod stream_viewer;
pub mod upload_panel;

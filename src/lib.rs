//! Live Detect CLI Library
//!
//! ライブ物体検出バックエンドのダッシュボード（端末版）

pub mod cli;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod poller;
pub mod render;
pub mod stream;

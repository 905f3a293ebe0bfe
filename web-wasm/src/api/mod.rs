//! バックエンドAPI

pub mod backend;

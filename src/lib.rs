// src/lib.rs

pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod media;
pub mod metadata;
pub mod namespace;
pub mod service;
pub mod storage;
pub mod util;

// src/lib.rs

//! KAMS announcements watcher library

pub mod auth;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

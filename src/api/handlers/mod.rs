//! HTTP request handlers

pub mod assets;
pub mod health;
pub mod home;
pub mod info;
pub mod preview;

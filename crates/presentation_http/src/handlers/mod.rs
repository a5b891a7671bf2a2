//! HTTP request handlers

pub mod departments;
pub mod health;
pub mod inventory;
pub mod session;
pub mod sharing;
pub mod statistics;

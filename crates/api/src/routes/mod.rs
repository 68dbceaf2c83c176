//! HTTP route handlers

pub mod features;
pub mod predict;
pub mod predictions;

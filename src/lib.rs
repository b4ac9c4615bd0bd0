pub mod alerts;
pub mod api;
pub mod booster;
pub mod config;
pub mod domain;
pub mod error;
pub mod intervention;
pub mod quiz;
pub mod random;
pub mod scoring;
pub mod store;
pub mod summary;

//! Application service layer - parking flows, config, repository wiring

pub mod app;
pub mod config;
pub mod repository;

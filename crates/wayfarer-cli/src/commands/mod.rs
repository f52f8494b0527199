pub mod audit;
pub mod auth;
pub mod chat;
pub mod config;
pub mod day;
pub mod diff;
pub mod geo;
pub mod mood;
pub mod reconcile;
pub mod signal;
pub mod trip;

pub mod app;
pub mod atomic;
pub mod backup;
pub mod codec;
pub mod collection;
pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod models;
pub mod recovery;
pub mod reminders;
pub mod store;
pub mod tracker;

mod routes_plan;
mod routes_projects;
mod routes_settings;
mod routes_tasks;

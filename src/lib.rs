pub mod app_state;
pub mod config;
pub mod entities;
pub mod errors;
pub mod matches;
pub mod probe;
pub mod repositories;
pub mod router;

pub mod client;
pub mod config;
pub mod routers;
pub mod routes;
pub mod state;
pub mod stream;

pub use axum;
pub use reqwest;
pub use serde_json;

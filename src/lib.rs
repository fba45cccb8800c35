pub mod auth;
pub mod cnfg;
pub mod error;
pub mod render;
pub mod routes;
pub mod validate;

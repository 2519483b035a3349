//! REST API: routes, handlers, request/response models, and error mapping.

pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;

/*
 * Responsibility
 * - HTTP surface: routes, handlers, DTOs, extractors
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::{guarded_routes, session_routes};

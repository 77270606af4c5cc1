/*
 * Responsibility
 * - Public entry points of the middleware stack
 * - app.rs applies them in a fixed order: auth on the guarded router, http around everything
 */
pub mod auth;
pub mod http;

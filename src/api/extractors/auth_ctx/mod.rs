/*!
 * Authentication context extractor
 *
 * - Gives handlers the authenticated request context (AuthCtx)
 * - axum-specific code stays in core; the type lives in types
 */

mod core;
mod types;

pub use self::core::AuthCtxExtractor;
pub use types::AuthCtx;

pub mod authenticator;
pub mod cookie;
pub mod factory;
pub mod mode;
pub mod password;
pub mod route_class;
pub mod session;
pub mod token_codec;

pub use authenticator::{AuthOutcome, AuthSource, RequestAuthenticator};
pub use factory::build_auth_services;
pub use session::SessionIssuer;

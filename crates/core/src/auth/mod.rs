mod enrich;
mod error;
mod functions;
mod gate;
mod traits;
mod types;
mod validation;

pub use enrich::enrich_session;
pub use error::AuthError;
pub use functions::{
    calculate_expiry, generate_state, is_flow_expired, is_session_expired, AUTH_FLOW_MAX_AGE,
};
pub use gate::{RouteGate, DEFAULT_EXEMPTIONS};
pub use traits::{AuthFlowRepository, IdentityProvider, Result};
pub use types::{
    AuthFlowState, OidcProvider, ProviderIdentity, Session, SessionUser, SignInPolicy,
};
pub use validation::validate_callback_url;

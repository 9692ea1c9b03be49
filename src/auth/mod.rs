pub mod authenticator;
pub mod form;

// Re-export so we can do "use crate::auth::*;"
pub use authenticator::{Authenticator, LoginOutcome};
pub use form::{FieldErrors, LoginForm, MIN_PASSWORD_LEN};

pub mod base;
pub mod oidc_userinfo_provider;
pub mod password_api_provider;
pub mod plain_provider;

pub use base::*;

//! Per-user OAuth credential storage and refresh.

mod oauth;

pub use oauth::OauthCredentialProvider;

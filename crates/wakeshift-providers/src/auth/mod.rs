//! OAuth credentials, the consent flow, token storage and the
//! [`CredentialProvider`] seam the API clients pull bearer tokens from.

mod credentials;
mod oauth;
mod session;
mod tokens;

pub use credentials::OAuthCredentials;
pub use oauth::{OAuthClient, OAuthEndpoints, RedirectTarget, TokenResponse};
pub use session::{CredentialProvider, OAuthSession, StaticToken};
pub use tokens::{TokenInfo, TokenStorage};

//! OAuth redirect handling for the Season relay host.
//!
//! The identity provider finishes login by redirecting a browser tab to a
//! `*.chromiumapp.org/` URL whose fragment carries the session tokens. This
//! crate recognizes that navigation, persists the tokens and sends the tab
//! on to the post-login page.

mod error;
mod fragment;
mod handler;

pub use error::{NavigationError, OAuthError, OAuthResult};
pub use fragment::{parse_fragment, ACCESS_TOKEN_FIELD, REFRESH_TOKEN_FIELD};
pub use handler::{Navigator, OAuthCallbackConfig, OAuthCallbackHandler};

//! Address derivation for the waiter notification channel.
//!
//! The channel lives on the same host as the waiter panel. The scheme is
//! swapped to its WebSocket counterpart (`http` → `ws`, `https` → `wss`)
//! and the path embeds the waiter identity:
//!
//! ```text
//! https://panel.example.com  →  wss://panel.example.com/ws/waiters/{identity}/
//! ```

use url::Url;

/// Errors produced while deriving a channel address.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("unsupported origin scheme: {0}")]
    UnsupportedScheme(String),

    #[error("origin cannot carry a path: {0}")]
    CannotBeABase(Url),
}

/// Build the WebSocket URL of the waiter channel for `identity`.
///
/// An empty identity is accepted and yields `/ws/waiters//`.
pub fn waiter_channel_url(origin: &Url, identity: &str) -> Result<Url, EndpointError> {
    if origin.cannot_be_a_base() {
        return Err(EndpointError::CannotBeABase(origin.clone()));
    }

    let scheme = match origin.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
    };

    let mut url = origin.clone();
    url.set_scheme(scheme)
        .map_err(|_| EndpointError::UnsupportedScheme(origin.scheme().to_string()))?;
    url.set_path(&format!("/ws/waiters/{identity}/"));
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

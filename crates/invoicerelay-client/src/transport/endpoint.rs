//! Endpoint URL construction.

use url::Url;

use invoicerelay_core::error::{RelayError, Result};

/// `<base>/<endpoint>/`, with `?token=<credential>` when a non-empty token is supplied.
pub fn endpoint_url(base: &str, endpoint: &str, token: Option<&str>) -> Result<Url> {
    let raw = format!(
        "{}/{}/",
        base.trim_end_matches('/'),
        endpoint.trim_matches('/')
    );
    let mut url = Url::parse(&raw)
        .map_err(|e| RelayError::Config(format!("invalid endpoint url {raw}: {e}")))?;

    if let Some(token) = token.filter(|t| !t.is_empty()) {
        url.query_pairs_mut().append_pair("token", token);
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn without_token() {
        let url = endpoint_url("ws://localhost:8000/ws", "invoices", None).unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8000/ws/invoices/");
    }

    #[test]
    fn with_token() {
        let url = endpoint_url("ws://localhost:8000/ws/", "ai-insights", Some("abc.def")).unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8000/ws/ai-insights/?token=abc.def");
    }

    #[test]
    fn token_is_encoded() {
        let url = endpoint_url("wss://relay.example.com/ws", "notifications", Some("a&b=c")).unwrap();
        assert_eq!(url.query(), Some("token=a%26b%3Dc"));
    }

    #[test]
    fn empty_token_is_absent() {
        let url = endpoint_url("ws://localhost:8000/ws", "invoices", Some("")).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn bad_base_is_config_error() {
        let err = endpoint_url("not a url", "invoices", None).unwrap_err();
        assert_eq!(err.code().as_str(), "CONFIG");
    }
}

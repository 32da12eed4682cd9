use crate::fetch::client::HttpClient;
use anyhow::Result;
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that injects a credential as an HTTP header.
///
/// The portal uses two: `X-API-KEY` carrying [`encode_key_pair`] for the key
/// exchange, then `Authorization: bearer <token>` for every other call.
pub struct ApiKey<C> {
    pub inner: C,
    header_name: HeaderName,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    /// Fails if the header name or value is not valid HTTP.
    pub fn new(inner: C, header_name: &str, value: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(value)?;
        value.set_sensitive(true);
        Ok(Self {
            inner,
            header_name: HeaderName::from_bytes(header_name.as_bytes())?,
            value,
        })
    }

    /// `Authorization: bearer <token>`, as the portal expects it.
    pub fn bearer(inner: C, token: &str) -> Result<Self> {
        Self::new(inner, "Authorization", &format!("bearer {token}"))
    }

    /// `X-API-KEY: base64(key_id:key)` for the key-login endpoint.
    pub fn key_pair(inner: C, key_id: &str, key: &str) -> Result<Self> {
        Self::new(inner, "X-API-KEY", &encode_key_pair(key_id, key))
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}

/// Base64 of `key_id:key`, the credential format of the key-login endpoint.
pub fn encode_key_pair(key_id: &str, key: &str) -> String {
    STANDARD.encode(format!("{key_id}:{key}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl HttpClient for Echo {
        async fn execute(&self, _req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            unreachable!("not called in these tests")
        }
    }

    #[test]
    fn test_encode_key_pair() {
        assert_eq!(encode_key_pair("id", "secret"), "aWQ6c2VjcmV0");
    }

    #[test]
    fn test_bearer_header() {
        let auth = ApiKey::bearer(Echo, "tok").unwrap();
        assert_eq!(auth.header_name, reqwest::header::AUTHORIZATION);
        assert_eq!(auth.value.to_str().unwrap(), "bearer tok");
        assert!(auth.value.is_sensitive());
    }

    #[test]
    fn test_key_pair_header() {
        let auth = ApiKey::key_pair(Echo, "id", "secret").unwrap();
        assert_eq!(auth.header_name.as_str(), "x-api-key");
        assert_eq!(auth.value.to_str().unwrap(), "aWQ6c2VjcmV0");
    }

    #[test]
    fn test_invalid_header_value_is_rejected() {
        assert!(ApiKey::new(Echo, "Authorization", "bad\nvalue").is_err());
    }
}

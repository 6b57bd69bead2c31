use secrecy::{ExposeSecret, SecretString};

/// API credentials for an OPNsense appliance.
///
/// OPNsense issues a key/secret pair per user (System > Access > Users >
/// API keys). Both halves are sent as HTTP basic auth on every request;
/// there is no session to establish or refresh.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub key: String,
    pub secret: SecretString,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: SecretString) -> Self {
        Self {
            key: key.into(),
            secret,
        }
    }

    /// Attach basic auth to a request builder.
    pub(crate) fn apply(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(&self.key, Some(self.secret.expose_secret()))
    }
}

//! Remote API client resolution.

/// Identity used to build a remote API client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Credential {
    /// No per-user identity.
    Anonymous,
    /// Authenticated with the given API key.
    Keyed(String),
}

impl Credential {
    /// Returns the API key, if any.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Keyed(key) => Some(key),
        }
    }
}

/// Builds remote API clients for a credential.
///
/// Any `Fn(&Credential) -> C` closure is a resolver.
pub trait ClientResolver: Send + Sync {
    /// Client type produced by the resolver.
    type Client;

    /// Returns a client authenticated with `credential`.
    fn resolve(&self, credential: &Credential) -> Self::Client;
}

impl<F, C> ClientResolver for F
where
    F: Fn(&Credential) -> C + Send + Sync,
{
    type Client = C;

    fn resolve(&self, credential: &Credential) -> C {
        self(credential)
    }
}

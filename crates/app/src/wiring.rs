//! Turns settings into the pieces the engine and the server are built from.

use std::{sync::Arc, time::Duration};

use engine::TokenCipher;
use plaid::LinkConfig;
use server::{IdentityVerifier, PassthroughVerifier, TokenInfoVerifier};

use crate::settings::{Identity, IdentityProvider, Plaid, Security};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_IDENTITY_TIMEOUT_SECS: u64 = 5;

pub fn build_verifier(identity: &Identity) -> Result<Arc<dyn IdentityVerifier>, BoxError> {
    match identity.provider {
        IdentityProvider::Google => {
            let timeout = Duration::from_secs(
                identity
                    .timeout_secs
                    .unwrap_or(DEFAULT_IDENTITY_TIMEOUT_SECS),
            );
            let audience = identity.audience.clone();
            let verifier = match &identity.tokeninfo_url {
                Some(url) => TokenInfoVerifier::new(url.clone(), audience, timeout)?,
                None => TokenInfoVerifier::google(audience, timeout)?,
            };
            if identity.audience.is_none() {
                tracing::warn!("identity.audience is not set, tokens of any client are accepted");
            }
            Ok(Arc::new(verifier))
        }
        IdentityProvider::Passthrough if identity.allow_insecure_passthrough => {
            tracing::warn!("passthrough identity enabled: bearer tokens are trusted as user ids");
            Ok(Arc::new(PassthroughVerifier))
        }
        IdentityProvider::Passthrough => Err(
            "identity.provider = \"passthrough\" requires identity.allow_insecure_passthrough = true"
                .into(),
        ),
    }
}

pub fn token_cipher(security: &Security) -> Result<Option<TokenCipher>, BoxError> {
    match security.token_key.as_deref() {
        Some(key) if !key.trim().is_empty() => Ok(Some(TokenCipher::from_base64_key(key)?)),
        _ => {
            tracing::warn!("security.token_key is not set, bank accounts cannot be linked");
            Ok(None)
        }
    }
}

pub fn link_config(plaid: &Plaid) -> LinkConfig {
    let defaults = LinkConfig::default();
    LinkConfig {
        client_name: plaid.client_name.clone().unwrap_or(defaults.client_name),
        products: plaid.products.clone().unwrap_or(defaults.products),
        country_codes: plaid.country_codes.clone().unwrap_or(defaults.country_codes),
        language: defaults.language,
        redirect_uri: plaid.redirect_uri.clone(),
    }
}

#[cfg(test)]
mod tests {
    use plaid::PlaidEnvironment;
    use server::IdentityError;

    use super::*;

    #[tokio::test]
    async fn passthrough_needs_the_explicit_flag() {
        let identity = Identity {
            provider: IdentityProvider::Passthrough,
            ..Identity::default()
        };
        assert!(build_verifier(&identity).is_err());

        let identity = Identity {
            allow_insecure_passthrough: true,
            ..identity
        };
        let verifier = build_verifier(&identity).unwrap();
        assert_eq!(verifier.verify("ext-alice").await, Ok("ext-alice".to_string()));
    }

    #[tokio::test]
    async fn tokeninfo_is_the_default_and_never_trusts_raw_ids() {
        let identity = Identity::default();
        assert_eq!(identity.provider, IdentityProvider::Google);
        assert!(build_verifier(&identity).is_ok());

        // Nothing listens on the discard port, so the check cannot pass.
        let identity = Identity {
            tokeninfo_url: Some("http://127.0.0.1:9/tokeninfo".to_string()),
            timeout_secs: Some(1),
            allow_insecure_passthrough: true,
            ..Identity::default()
        };
        let verifier = build_verifier(&identity).unwrap();
        assert!(matches!(
            verifier.verify("ext-alice").await,
            Err(IdentityError::Unavailable(_))
        ));
    }

    #[test]
    fn token_key_is_optional_but_must_be_valid() {
        assert!(token_cipher(&Security::default()).unwrap().is_none());

        let key = Security {
            token_key: Some("AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8=".to_string()),
        };
        assert!(token_cipher(&key).unwrap().is_some());

        let short = Security {
            token_key: Some("c2hvcnQ=".to_string()),
        };
        assert!(token_cipher(&short).is_err());
    }

    #[test]
    fn link_config_falls_back_to_defaults() {
        let plaid = Plaid {
            environment: PlaidEnvironment::Sandbox,
            client_id: "id".to_string(),
            secret: "secret".to_string(),
            timeout_secs: 10,
            client_name: None,
            products: Some(vec!["transactions".to_string(), "auth".to_string()]),
            country_codes: None,
            redirect_uri: Some("https://app.example.com/oauth".to_string()),
        };
        let link = link_config(&plaid);
        assert_eq!(link.client_name, "Finlit");
        assert_eq!(link.products, vec!["transactions", "auth"]);
        assert_eq!(link.country_codes, vec!["US"]);
        assert_eq!(link.redirect_uri.as_deref(), Some("https://app.example.com/oauth"));
    }
}

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims shared by access and refresh tokens.
///
/// Access tokens carry `exp`. Refresh tokens carry a random `jti` and no
/// `exp`: they stay valid until the stored copy is overwritten.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String,  // user email
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub exp: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub jti: Option<String>,
}

/// HS256 signer/verifier holding the process-wide secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, access_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
        }
    }

    pub fn issue_access_token(&self, subject: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_access_token_with_ttl(subject, self.access_ttl)
    }

    pub fn issue_access_token_with_ttl(
        &self,
        subject: &str,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let exp = (Utc::now() + ttl).timestamp().max(0) as usize;

        let claims = Claims {
            sub: subject.to_string(),
            exp: Some(exp),
            jti: None,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    pub fn issue_refresh_token(&self, subject: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: None,
            jti: Some(Uuid::new_v4().to_string()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// Expired, tampered and garbage tokens all come back as `None`.
    pub fn decode(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp is checked when present but refresh tokens legitimately omit it
        validation.set_required_spec_claims(&["sub"]);
        validation.leeway = 0;

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                log::debug!("Token rejected: {}", e);
                None
            }
        }
    }
}

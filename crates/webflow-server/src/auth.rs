//! Designer identity verification for the multi-tenant host.
//!
//! Only the check is implemented here. Tokens are minted elsewhere.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use webflow_core::SiteId;

/// Why a connecting Designer was refused.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    /// No bearer token in the header or query.
    #[error("missing token")]
    MissingToken,
    /// Signature, expiry or issuer check failed.
    #[error("invalid token: {0}")]
    InvalidToken(String),
    /// The token verified but names no site.
    #[error("token carries no site id")]
    MissingSite,
}

impl AuthError {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::InvalidToken(_) => "invalid_token",
            Self::MissingSite => "missing_site",
        }
    }
}

/// Maps a presented token to the site it grants access to.
pub trait TokenVerifier: Send + Sync {
    /// Verify `token` and return its site, or refuse.
    fn verify(&self, token: &str) -> Result<SiteId, AuthError>;
}

#[derive(Debug, Deserialize)]
struct DesignerClaims {
    #[serde(rename = "siteId", default)]
    site_id: Option<String>,
}

/// HS256 shared-secret verifier. The token must carry `exp` and a `siteId`
/// claim, and `iss` when an issuer is configured.
pub struct JwtTokenVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    /// Create a verifier for `secret`, optionally pinning the issuer.
    pub fn new(secret: &str, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        if let Some(iss) = issuer {
            validation.set_issuer(&[iss]);
        }
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, token: &str) -> Result<SiteId, AuthError> {
        let data = decode::<DesignerClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        SiteId::parse_opt(data.claims.site_id.as_deref()).ok_or(AuthError::MissingSite)
    }
}

/// Pull the token from `Authorization: Bearer ...`, falling back to `?token=`.
pub fn extract_token<'a>(headers: &'a HeaderMap, query_token: Option<&'a str>) -> Option<&'a str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| query_token.map(str::trim).filter(|t| !t.is_empty()))
}

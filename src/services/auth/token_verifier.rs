//! HMAC access-token verification.
//!
//! Flow: split → classify `alg` from the raw header → signature (+ iss/aud when pinned)
//! → exp/nbf → project `email`.
//! The `alg` check runs on our own parse of the header so that `none` and unknown
//! algorithms are classified before the secret is ever used.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde::Deserialize;
use thiserror::Error;

use crate::services::auth::secret::SharedSecret;

const SYMMETRIC_ALGORITHMS: [Algorithm; 3] =
    [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("malformed token")]
    MalformedToken,
    #[error("unsupported signing algorithm")]
    UnsupportedAlgorithm,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token not yet valid")]
    NotYetValid,
    #[error("missing or unexpected 'iss' claim")]
    InvalidIssuer,
    #[error("missing or unexpected 'aud' claim")]
    InvalidAudience,
    #[error("missing 'email' claim")]
    MissingIdentityClaim,
}

impl From<jsonwebtoken::errors::Error> for VerificationError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => Self::UnsupportedAlgorithm,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidIssuer => Self::InvalidIssuer,
            ErrorKind::InvalidAudience => Self::InvalidAudience,
            ErrorKind::MissingRequiredClaim(claim) => match claim.as_str() {
                "iss" => Self::InvalidIssuer,
                "aud" => Self::InvalidAudience,
                _ => Self::MalformedToken,
            },
            _ => Self::MalformedToken,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawHeader {
    alg: String,
}

/// Claims this service reads. Everything else in the payload is ignored.
///
/// `exp`/`nbf` are NumericDate values, which may carry a fraction.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    exp: Option<f64>,
    #[serde(default)]
    nbf: Option<f64>,
}

/// Identity taken from a token that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: String,
    pub subject: Option<String>,
}

#[derive(Clone)]
pub struct TokenVerifier {
    secret: SharedSecret,
    decoding_key: DecodingKey,
    validation: Validation,
    leeway_seconds: u64,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("secret", &self.secret)
            .field("validation", &self.validation)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl TokenVerifier {
    /// `issuer` / `audience` pin the corresponding claims when set; otherwise those
    /// claims are not inspected.
    pub fn new(
        secret: SharedSecret,
        issuer: Option<&str>,
        audience: Option<&str>,
        leeway_seconds: u64,
    ) -> Self {
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = SYMMETRIC_ALGORITHMS.to_vec();
        // exp/nbf are checked in `check_time_window`, where absence is allowed.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;

        if let Some(iss) = issuer {
            validation.set_issuer(&[iss]);
            validation.required_spec_claims.insert("iss".to_string());
        }
        match audience {
            Some(aud) => {
                validation.set_audience(&[aud]);
                validation.required_spec_claims.insert("aud".to_string());
            }
            None => validation.validate_aud = false,
        }

        Self {
            secret,
            decoding_key,
            validation,
            leeway_seconds,
        }
    }

    pub fn verify(&self, credential: &str) -> Result<VerifiedIdentity, VerificationError> {
        self.verify_at(credential, chrono::Utc::now().timestamp())
    }

    pub(crate) fn verify_at(
        &self,
        credential: &str,
        now: i64,
    ) -> Result<VerifiedIdentity, VerificationError> {
        ensure_symmetric_algorithm(credential)?;

        let data =
            jsonwebtoken::decode::<TokenClaims>(credential, &self.decoding_key, &self.validation)?;
        let claims = data.claims;

        check_time_window(&claims, now, self.leeway_seconds)?;

        let email = claims
            .email
            .filter(|email| !email.is_empty())
            .ok_or(VerificationError::MissingIdentityClaim)?;

        Ok(VerifiedIdentity {
            email,
            subject: claims.sub,
        })
    }
}

/// Reads `alg` from the header segment and accepts only HMAC algorithms.
fn ensure_symmetric_algorithm(credential: &str) -> Result<(), VerificationError> {
    let segments: Vec<&str> = credential.split('.').collect();
    let [header, _, _] = segments.as_slice() else {
        return Err(VerificationError::MalformedToken);
    };

    let raw = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| VerificationError::MalformedToken)?;
    let header: RawHeader =
        serde_json::from_slice(&raw).map_err(|_| VerificationError::MalformedToken)?;

    match header.alg.as_str() {
        "HS256" | "HS384" | "HS512" => Ok(()),
        _ => Err(VerificationError::UnsupportedAlgorithm),
    }
}

// exp: reject on or after `exp + leeway`. nbf: reject before `nbf - leeway`.
fn check_time_window(
    claims: &TokenClaims,
    now: i64,
    leeway_seconds: u64,
) -> Result<(), VerificationError> {
    let now = now as f64;
    let leeway = leeway_seconds as f64;

    if let Some(exp) = claims.exp
        && now >= exp + leeway
    {
        return Err(VerificationError::Expired);
    }
    if let Some(nbf) = claims.nbf
        && now + leeway < nbf
    {
        return Err(VerificationError::NotYetValid);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use base64::Engine as _;
    use serde_json::json;

    use super::*;
    use crate::services::auth::test_support::{forge, mint, mint_with, now};

    fn verifier(secret: &str) -> TokenVerifier {
        TokenVerifier::new(SharedSecret::new(secret).unwrap(), None, None, 0)
    }

    #[test]
    fn returns_embedded_email_for_valid_token() {
        let token = mint("topsecret", json!({"email": "a@b.com", "exp": now() + 3600}));

        let identity = verifier("topsecret").verify(&token).unwrap();

        assert_eq!(identity.email, "a@b.com");
        assert_eq!(identity.subject, None);
    }

    #[test]
    fn identity_is_not_normalized() {
        let token = mint(
            "topsecret",
            json!({"email": " Mixed.Case+tag@Example.COM", "sub": "user-1"}),
        );

        let identity = verifier("topsecret").verify(&token).unwrap();

        assert_eq!(identity.email, " Mixed.Case+tag@Example.COM");
        assert_eq!(identity.subject.as_deref(), Some("user-1"));
    }

    #[test]
    fn accepts_every_hmac_variant() {
        for alg in [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512] {
            let token = mint_with(alg, "topsecret", json!({"email": "a@b.com"}));
            assert!(verifier("topsecret").verify(&token).is_ok(), "{alg:?}");
        }
    }

    #[test]
    fn token_without_exp_is_accepted() {
        let token = mint("topsecret", json!({"email": "a@b.com"}));
        assert!(verifier("topsecret").verify(&token).is_ok());
    }

    #[test]
    fn wrong_secret_is_invalid_signature() {
        let token = mint("topsecret", json!({"email": "a@b.com", "exp": now() + 3600}));

        let err = verifier("wrongsecret").verify(&token).unwrap_err();

        assert_eq!(err, VerificationError::InvalidSignature);
    }

    #[test]
    fn tampered_payload_is_invalid_signature() {
        let token = mint("topsecret", json!({"email": "a@b.com"}));
        let forged_payload = URL_SAFE_NO_PAD.encode(br#"{"email":"admin@b.com"}"#);
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = forged_payload.as_str();

        let err = verifier("topsecret").verify(&parts.join(".")).unwrap_err();

        assert_eq!(err, VerificationError::InvalidSignature);
    }

    #[test]
    fn alg_none_is_unsupported() {
        let token = forge(json!({"alg": "none", "typ": "JWT"}), json!({"email": "a@b.com"}), "");

        let err = verifier("topsecret").verify(&token).unwrap_err();

        assert_eq!(err, VerificationError::UnsupportedAlgorithm);
    }

    #[test]
    fn asymmetric_and_unknown_algorithms_are_unsupported() {
        // Reuse a genuine HS256 signature so only the header differs.
        let valid = mint("topsecret", json!({"email": "a@b.com"}));
        let signature = valid.rsplit('.').next().unwrap();

        for alg in ["RS256", "ES256", "PS512", "EdDSA", "hs256", "HS1024", ""] {
            let token = forge(json!({"alg": alg}), json!({"email": "a@b.com"}), signature);
            let err = verifier("topsecret").verify(&token).unwrap_err();
            assert_eq!(err, VerificationError::UnsupportedAlgorithm, "alg={alg:?}");
        }
    }

    #[test]
    fn structural_garbage_is_malformed() {
        let v = verifier("topsecret");
        let no_alg = URL_SAFE_NO_PAD.encode(br#"{"typ":"JWT"}"#);

        for token in [
            "".to_string(),
            "not-a-token".to_string(),
            "a.b".to_string(),
            "a.b.c.d".to_string(),
            "!!!.e30.c2ln".to_string(),
            format!("{}.e30.c2ln", URL_SAFE_NO_PAD.encode(b"not json")),
            format!("{no_alg}.e30.c2ln"),
        ] {
            assert_eq!(
                v.verify(&token).unwrap_err(),
                VerificationError::MalformedToken,
                "token={token:?}"
            );
        }
    }

    #[test]
    fn past_exp_is_expired() {
        let token = mint("topsecret", json!({"email": "a@b.com", "exp": now() - 3600}));

        let err = verifier("topsecret").verify(&token).unwrap_err();

        assert_eq!(err, VerificationError::Expired);
    }

    #[test]
    fn exp_boundary_and_leeway() {
        let token = mint("topsecret", json!({"email": "a@b.com", "exp": 1_000}));

        let strict = verifier("topsecret");
        assert!(strict.verify_at(&token, 999).is_ok());
        assert_eq!(
            strict.verify_at(&token, 1_000).unwrap_err(),
            VerificationError::Expired
        );

        let lenient = TokenVerifier::new(SharedSecret::new("topsecret").unwrap(), None, None, 30);
        assert!(lenient.verify_at(&token, 1_029).is_ok());
        assert_eq!(
            lenient.verify_at(&token, 1_030).unwrap_err(),
            VerificationError::Expired
        );
    }

    #[test]
    fn fractional_exp_is_enforced() {
        let token = mint("topsecret", json!({"email": "a@b.com", "exp": 1_000.5}));

        let v = verifier("topsecret");
        assert!(v.verify_at(&token, 1_000).is_ok());
        assert_eq!(v.verify_at(&token, 1_001).unwrap_err(), VerificationError::Expired);
    }

    #[test]
    fn future_nbf_is_not_yet_valid() {
        let token = mint("topsecret", json!({"email": "a@b.com", "nbf": now() + 3600}));

        let err = verifier("topsecret").verify(&token).unwrap_err();

        assert_eq!(err, VerificationError::NotYetValid);
    }

    #[test]
    fn non_numeric_exp_is_malformed() {
        let token = mint("topsecret", json!({"email": "a@b.com", "exp": "tomorrow"}));

        let err = verifier("topsecret").verify(&token).unwrap_err();

        assert_eq!(err, VerificationError::MalformedToken);
    }

    #[test]
    fn missing_or_empty_email_is_rejected() {
        let v = verifier("topsecret");
        for claims in [
            json!({"sub": "user-1"}),
            json!({"email": null}),
            json!({"email": ""}),
        ] {
            let token = mint("topsecret", claims.clone());
            assert_eq!(
                v.verify(&token).unwrap_err(),
                VerificationError::MissingIdentityClaim,
                "claims={claims}"
            );
        }
    }

    #[test]
    fn signature_is_checked_before_claims() {
        let token = mint("topsecret", json!({"exp": now() - 3600}));

        let err = verifier("wrongsecret").verify(&token).unwrap_err();

        assert_eq!(err, VerificationError::InvalidSignature);
    }

    #[test]
    fn pinned_issuer_and_audience() {
        let secret = SharedSecret::new("topsecret").unwrap();
        let v = TokenVerifier::new(secret, Some("https://issuer.test"), Some("authenticated"), 0);

        let good = mint(
            "topsecret",
            json!({"email": "a@b.com", "iss": "https://issuer.test", "aud": "authenticated"}),
        );
        assert!(v.verify(&good).is_ok());

        let wrong_iss = mint(
            "topsecret",
            json!({"email": "a@b.com", "iss": "https://evil.test", "aud": "authenticated"}),
        );
        assert_eq!(v.verify(&wrong_iss).unwrap_err(), VerificationError::InvalidIssuer);

        let no_iss = mint("topsecret", json!({"email": "a@b.com", "aud": "authenticated"}));
        assert_eq!(v.verify(&no_iss).unwrap_err(), VerificationError::InvalidIssuer);

        let wrong_aud = mint(
            "topsecret",
            json!({"email": "a@b.com", "iss": "https://issuer.test", "aud": "anon"}),
        );
        assert_eq!(v.verify(&wrong_aud).unwrap_err(), VerificationError::InvalidAudience);

        let no_aud = mint("topsecret", json!({"email": "a@b.com", "iss": "https://issuer.test"}));
        assert_eq!(v.verify(&no_aud).unwrap_err(), VerificationError::InvalidAudience);
    }

    #[test]
    fn unpinned_verifier_ignores_iss_and_aud() {
        let token = mint(
            "topsecret",
            json!({"email": "a@b.com", "iss": "anyone", "aud": ["x", "y"]}),
        );
        assert!(verifier("topsecret").verify(&token).is_ok());
    }

    #[test]
    fn verify_is_idempotent() {
        let v = verifier("topsecret");
        let good = mint("topsecret", json!({"email": "a@b.com", "exp": now() + 3600}));
        let bad = mint("other", json!({"email": "a@b.com"}));

        assert_eq!(v.verify(&good), v.verify(&good));
        assert_eq!(v.verify(&bad), v.verify(&bad));
    }

    #[test]
    fn debug_hides_secret() {
        let printed = format!("{:?}", verifier("topsecret"));
        assert!(!printed.contains("topsecret"));
    }
}

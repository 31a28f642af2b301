// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and validation.
//!
//! Tokens are compact JWTs (`header.payload.signature`, base64url) signed
//! with an HMAC secret held for the whole process lifetime.
//!
//! ## Validation order
//!
//! 1. Header and payload must be base64url, else the token is malformed
//! 2. The signature segment must be base64url, else the signature is invalid
//! 3. The header algorithm must equal the configured one (no substitution)
//! 4. The signature must verify
//! 5. Only then are the claims deserialized
//! 6. `now < exp`, strictly, with no leeway

use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use utoipa::ToSchema;

use super::{AuthError, Principal, TokenClaims};
use crate::config::TokenConfig;

/// A freshly signed token.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IssuedToken {
    /// Compact JWT
    pub token: String,
    /// Unix seconds
    pub issued_at: i64,
    /// Unix seconds, exclusive
    pub expires_at: i64,
}

/// Signs and verifies bearer tokens.
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenCodec {
    pub fn new(config: &TokenConfig) -> Self {
        let algorithm = config.algorithm.as_jwt();

        // Expiry is checked by hand so that `now == exp` already counts as
        // expired; the library check is inclusive.
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(&config.secret),
            decoding_key: DecodingKey::from_secret(&config.secret),
            validation,
            ttl_secs: i64::try_from(config.ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs.unsigned_abs())
    }

    /// Issue a token for `principal`, valid from now for the configured TTL.
    pub fn issue(&self, principal: &Principal) -> Result<IssuedToken, AuthError> {
        self.issue_at(principal, now())
    }

    /// Issue a token as if the current time were `now` (Unix seconds).
    pub fn issue_at(&self, principal: &Principal, now: i64) -> Result<IssuedToken, AuthError> {
        let claims = TokenClaims {
            sub: principal.identifier.clone(),
            role: principal.role,
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("failed to sign token: {e}")))?;

        tracing::debug!(
            subject = %claims.sub,
            role = %claims.role,
            expires_at = claims.exp,
            "issued token"
        );

        Ok(IssuedToken {
            token,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    /// Validate a token against the current time.
    pub fn validate(&self, token: &str) -> Result<Principal, AuthError> {
        self.validate_at(token, now())
    }

    /// Validate a token as if the current time were `now` (Unix seconds).
    pub fn validate_at(&self, token: &str, now: i64) -> Result<Principal, AuthError> {
        check_segments(token)?;

        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    AuthError::InvalidSignature
                }
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::MalformedToken,
            })?;

        if now >= data.claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(Principal::from(data.claims))
    }
}

/// Classify encoding damage by segment before handing the token to the
/// library, which reports every base64 failure the same way.
///
/// A signature segment that is not canonical base64url (stray character,
/// extra `.`, non-zero trailing bits) is a bad signature, not a bad token.
fn check_segments(token: &str) -> Result<(), AuthError> {
    let mut segments = token.splitn(3, '.');
    let (Some(header), Some(payload), Some(signature)) =
        (segments.next(), segments.next(), segments.next())
    else {
        return Err(AuthError::MalformedToken);
    };

    if URL_SAFE_NO_PAD.decode(header).is_err() || URL_SAFE_NO_PAD.decode(payload).is_err() {
        return Err(AuthError::MalformedToken);
    }
    if signature.contains('.') || URL_SAFE_NO_PAD.decode(signature).is_err() {
        return Err(AuthError::InvalidSignature);
    }
    Ok(())
}

fn now() -> i64 {
    Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::config::SigningAlgorithm;

    const T0: i64 = 1_700_000_000;

    fn codec_with(secret: &str, algorithm: SigningAlgorithm, ttl_secs: u64) -> TokenCodec {
        TokenCodec::new(&TokenConfig {
            secret: secret.as_bytes().to_vec(),
            algorithm,
            ttl: Duration::from_secs(ttl_secs),
        })
    }

    fn codec() -> TokenCodec {
        codec_with(
            "test-secret-key-test-secret-key-1234",
            SigningAlgorithm::Hs256,
            3600,
        )
    }

    fn admin() -> Principal {
        Principal::new("admin@hotmail.com", Role::Admin)
    }

    fn replace_segment(token: &str, index: usize, segment: &str) -> String {
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[index] = segment;
        parts.join(".")
    }

    #[test]
    fn issued_token_validates_to_same_principal() {
        let codec = codec();
        let issued = codec.issue(&admin()).unwrap();
        assert_eq!(codec.validate(&issued.token).unwrap(), admin());

        let user = Principal::new("user1@hotmail.com", Role::User);
        let issued = codec.issue(&user).unwrap();
        assert_eq!(codec.validate(&issued.token).unwrap(), user);
    }

    #[test]
    fn issue_sets_iat_and_exp_from_ttl() {
        assert_eq!(codec().ttl(), Duration::from_secs(3600));
        let issued = codec().issue_at(&admin(), T0).unwrap();
        assert_eq!(issued.issued_at, T0);
        assert_eq!(issued.expires_at, T0 + 3600);
        assert_eq!(issued.token.split('.').count(), 3);
    }

    #[test]
    fn payload_carries_sub_role_iat_exp() {
        let issued = codec().issue_at(&admin(), T0).unwrap();
        let payload = issued.token.split('.').nth(1).unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();
        assert_eq!(json["sub"], "admin@hotmail.com");
        assert_eq!(json["role"], "ADMIN");
        assert_eq!(json["iat"], T0);
        assert_eq!(json["exp"], T0 + 3600);
    }

    #[test]
    fn expiry_is_strict() {
        let codec = codec();
        let issued = codec.issue_at(&admin(), T0).unwrap();

        assert!(codec.validate_at(&issued.token, T0).is_ok());
        assert!(codec.validate_at(&issued.token, T0 + 3599).is_ok());
        assert_eq!(
            codec.validate_at(&issued.token, T0 + 3600),
            Err(AuthError::TokenExpired)
        );
        assert_eq!(
            codec.validate_at(&issued.token, T0 + 7200),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn token_issued_in_the_past_is_expired() {
        let codec = codec();
        let issued = codec.issue_at(&admin(), T0).unwrap();
        assert_eq!(codec.validate(&issued.token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn signature_bit_flip_is_rejected() {
        let codec = codec();
        let issued = codec.issue(&admin()).unwrap();
        let signature = issued.token.split('.').nth(2).unwrap();

        let mut raw = URL_SAFE_NO_PAD.decode(signature).unwrap();
        raw[0] ^= 0x01;
        let tampered = replace_segment(&issued.token, 2, &URL_SAFE_NO_PAD.encode(raw));

        assert_eq!(codec.validate(&tampered), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn every_bit_flip_in_encoded_signature_is_invalid_signature() {
        let codec = codec();
        let issued = codec.issue(&admin()).unwrap();
        let signature = issued.token.split('.').nth(2).unwrap().as_bytes().to_vec();

        for pos in 0..signature.len() {
            for bit in 0..7 {
                let mut flipped = signature.clone();
                flipped[pos] ^= 1 << bit;
                let flipped = String::from_utf8(flipped).unwrap();
                let tampered = replace_segment(&issued.token, 2, &flipped);

                assert_eq!(
                    codec.validate(&tampered),
                    Err(AuthError::InvalidSignature),
                    "pos={pos} bit={bit} segment={flipped}"
                );
            }
        }
    }

    #[test]
    fn damaged_header_or_payload_is_malformed() {
        let codec = codec();
        let issued = codec.issue(&admin()).unwrap();

        let bad_header = replace_segment(&issued.token, 0, "eyJ!bad");
        assert_eq!(codec.validate(&bad_header), Err(AuthError::MalformedToken));

        let bad_payload = replace_segment(&issued.token, 1, "not*base64");
        assert_eq!(codec.validate(&bad_payload), Err(AuthError::MalformedToken));

        let missing_signature = issued.token.rsplitn(2, '.').nth(1).unwrap().to_string();
        assert_eq!(
            codec.validate(&missing_signature),
            Err(AuthError::MalformedToken)
        );
    }

    #[test]
    fn payload_tampering_is_rejected() {
        let codec = codec();
        let issued = codec.issue(&Principal::new("user1@hotmail.com", Role::User)).unwrap();

        let forged_claims = format!(
            r#"{{"sub":"user1@hotmail.com","role":"ADMIN","iat":{},"exp":{}}}"#,
            issued.issued_at, issued.expires_at
        );
        let forged = replace_segment(&issued.token, 1, &URL_SAFE_NO_PAD.encode(forged_claims));

        assert_eq!(codec.validate(&forged), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let issuer = codec_with("secret-one-secret-one-secret-one-1", SigningAlgorithm::Hs256, 60);
        let verifier = codec_with("secret-two-secret-two-secret-two-2", SigningAlgorithm::Hs256, 60);
        let issued = issuer.issue(&admin()).unwrap();
        assert_eq!(verifier.validate(&issued.token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn algorithm_substitution_is_rejected() {
        let secret = "shared-secret-shared-secret-shared";
        let issuer = codec_with(secret, SigningAlgorithm::Hs512, 60);
        let verifier = codec_with(secret, SigningAlgorithm::Hs256, 60);
        let issued = issuer.issue(&admin()).unwrap();
        assert_eq!(verifier.validate(&issued.token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn unsigned_token_is_rejected() {
        let codec = codec();
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(
            r#"{"sub":"admin@hotmail.com","role":"ADMIN","iat":1,"exp":9999999999}"#,
        );
        let token = format!("{header}.{claims}.");
        assert_eq!(codec.validate(&token), Err(AuthError::MalformedToken));
    }

    #[test]
    fn signed_token_missing_a_claim_is_malformed() {
        let codec = codec();
        let key = EncodingKey::from_secret(b"test-secret-key-test-secret-key-1234");
        let header = Header::new(Algorithm::HS256);

        let sub = "admin@hotmail.com";
        let without_role = serde_json::json!({ "sub": sub, "iat": T0, "exp": T0 + 60 });
        let without_iat = serde_json::json!({ "sub": sub, "role": "ADMIN", "exp": T0 + 60 });
        let without_exp = serde_json::json!({ "sub": sub, "role": "ADMIN", "iat": T0 });

        for claims in [without_role, without_iat, without_exp] {
            let token = encode(&header, &claims, &key).unwrap();
            assert_eq!(
                codec.validate_at(&token, T0),
                Err(AuthError::MalformedToken),
                "claims: {claims}"
            );
        }
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec();
        assert_eq!(codec.validate("not-a-token"), Err(AuthError::MalformedToken));
        assert_eq!(codec.validate(""), Err(AuthError::MalformedToken));
        assert_eq!(codec.validate("a.b.c"), Err(AuthError::MalformedToken));
    }

    #[test]
    fn repeated_validation_is_stable() {
        let codec = codec();
        let issued = codec.issue(&admin()).unwrap();
        let first = codec.validate(&issued.token).unwrap();
        for _ in 0..5 {
            assert_eq!(codec.validate(&issued.token).unwrap(), first);
        }
    }
}

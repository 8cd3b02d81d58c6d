use crate::types::{AppError, AuthFailure, Claims, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Map;
use std::fmt;

/// The only algorithm tokens are signed and accepted with.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Server-wide HMAC key for session tokens.
///
/// Loaded once at startup and never mutated. `Debug` never prints the key.
#[derive(Clone)]
pub struct SigningSecret(SecretString);

impl SigningSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(SecretString::from(secret.into()))
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.0.expose_secret().as_bytes())
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.0.expose_secret().as_bytes())
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret([REDACTED])")
    }
}

/// Session token issuer and verifier.
///
/// Tokens are stateless HS256 JWTs with a fixed lifetime; nothing is stored
/// server side, so a token stays usable until it expires.
#[derive(Debug, Clone)]
pub struct TokenService {
    secret: SigningSecret,
    lifetime: Duration,
}

impl TokenService {
    /// Creates a new TokenService.
    ///
    /// # Arguments
    /// * `secret` - Key for signing tokens (should be at least 32 bytes)
    /// * `lifetime` - How long a minted token stays valid
    pub fn new(secret: SigningSecret, lifetime: Duration) -> Self {
        Self { secret, lifetime }
    }

    /// Mints a token for `subject` valid from now until now + lifetime.
    pub fn mint(&self, subject: i64) -> Result<String> {
        self.mint_at(subject, Utc::now())
    }

    /// Mints a token as if the current time were `now`.
    pub fn mint_at(&self, subject: i64, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.lifetime)
                .ok_or_else(|| AppError::Internal("Token expiry is out of range".to_string()))?
                .timestamp(),
        };

        encode(
            &Header::new(TOKEN_ALGORITHM),
            &claims,
            &self.secret.encoding_key(),
        )
        .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token and returns the subject id it was minted for.
    pub fn verify(&self, token: &str) -> std::result::Result<i64, AuthFailure> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies a token against the clock value `now`.
    ///
    /// Checks run in a fixed order: structure, signature, expiry, subject.
    /// Once the header and payload parse, any failure in the signature
    /// segment (including bad base64) is `BadSignature`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> std::result::Result<i64, AuthFailure> {
        let payload = parse_payload(token)?;

        // Expiry is checked below against `now` rather than the wall clock,
        // so only the signature is validated here.
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<serde_json::Value>(token, &self.secret.decoding_key(), &validation).map_err(|e| {
            tracing::trace!(kind = ?e.kind(), "token signature rejected");
            AuthFailure::BadSignature
        })?;

        let exp = payload
            .get("exp")
            .and_then(serde_json::Value::as_i64)
            .ok_or(AuthFailure::Malformed)?;
        if now.timestamp() >= exp {
            return Err(AuthFailure::Expired);
        }

        payload
            .get("sub")
            .and_then(serde_json::Value::as_str)
            .and_then(|sub| sub.parse::<i64>().ok())
            .ok_or(AuthFailure::Malformed)
    }
}

/// Structural check of a compact token: three segments, a readable header
/// and a base64url JSON object as payload. Returns the payload claims.
fn parse_payload(token: &str) -> std::result::Result<Map<String, serde_json::Value>, AuthFailure> {
    let segments: Vec<&str> = token.split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return Err(AuthFailure::Malformed);
    };

    decode_header(token).map_err(|_| AuthFailure::Malformed)?;

    let bytes = Base64UrlUnpadded::decode_vec(payload).map_err(|_| AuthFailure::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthFailure::Malformed)
}

/// Mints a token for `subject` signed with `secret`, valid for `lifetime`.
pub fn mint_token(subject: i64, secret: &SigningSecret, lifetime: Duration) -> Result<String> {
    TokenService::new(secret.clone(), lifetime).mint(subject)
}

/// Verifies `token` under `secret` and returns its subject.
pub fn verify_token(token: &str, secret: &SigningSecret) -> std::result::Result<i64, AuthFailure> {
    // Lifetime only affects minting; the token carries its own expiry.
    TokenService::new(secret.clone(), Duration::zero()).verify(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_test_service() -> TokenService {
        TokenService::new(
            SigningSecret::new("test-secret-key-that-is-at-least-32-chars"),
            Duration::minutes(30),
        )
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    /// Signs arbitrary claims with the test secret.
    fn sign(claims: serde_json::Value) -> String {
        encode(
            &Header::new(TOKEN_ALGORITHM),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key-that-is-at-least-32-chars"),
        )
        .expect("should encode")
    }

    #[test]
    fn test_token_generation() {
        let service = create_test_service();

        let token = service.mint(7).expect("should mint token");

        assert!(!token.is_empty(), "token should not be empty");
        assert_eq!(token.split('.').count(), 3, "token should be a compact JWT");
    }

    #[test]
    fn test_token_verification_success() {
        let service = create_test_service();

        let token = service.mint(456).expect("should mint token");
        let subject = service.verify(&token).expect("should verify token");

        assert_eq!(subject, 456, "subject should match user id");
    }

    #[test]
    fn test_claims_expiration() {
        let service = create_test_service();
        let token = service.mint_at(1, t0()).expect("should mint");

        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret-key-that-is-at-least-32-chars"),
            &{
                let mut v = Validation::new(TOKEN_ALGORITHM);
                v.validate_exp = false;
                v
            },
        )
        .expect("should decode");

        assert_eq!(data.header.alg, Algorithm::HS256);
        assert_eq!(data.claims.sub, "1");
        assert_eq!(data.claims.iat, t0().timestamp());
        assert_eq!(data.claims.exp, t0().timestamp() + 30 * 60);
    }

    #[test]
    fn test_expiry_boundary() {
        let service = create_test_service();
        let token = service.mint_at(9, t0()).expect("should mint");
        let lifetime = Duration::minutes(30);

        assert_eq!(
            service.verify_at(&token, t0() + lifetime - Duration::seconds(1)),
            Ok(9)
        );
        assert_eq!(
            service.verify_at(&token, t0() + lifetime),
            Err(AuthFailure::Expired)
        );
        assert_eq!(
            service.verify_at(&token, t0() + lifetime + Duration::seconds(1)),
            Err(AuthFailure::Expired)
        );
    }

    #[test]
    fn test_subject_42_scenario() {
        let secret = SigningSecret::new("s");
        let service = TokenService::new(secret, Duration::minutes(30));
        let wrong = TokenService::new(SigningSecret::new("wrong"), Duration::minutes(30));

        let token = service.mint_at(42, t0()).expect("should mint");

        assert_eq!(service.verify_at(&token, t0() + Duration::minutes(10)), Ok(42));
        assert_eq!(
            service.verify_at(&token, t0() + Duration::minutes(31)),
            Err(AuthFailure::Expired)
        );
        assert_eq!(
            wrong.verify_at(&token, t0() + Duration::minutes(10)),
            Err(AuthFailure::BadSignature)
        );
    }

    #[test]
    fn test_token_verification_wrong_secret() {
        let service1 = TokenService::new(
            SigningSecret::new("secret-one-that-is-32-chars-long"),
            Duration::minutes(15),
        );
        let service2 = TokenService::new(
            SigningSecret::new("secret-two-that-is-32-chars-long"),
            Duration::minutes(15),
        );

        let token = service1.mint(789).expect("should mint");

        assert_eq!(service2.verify(&token), Err(AuthFailure::BadSignature));
    }

    /// Replaces the character at `index` of the signature segment.
    fn replace_signature_char(token: &str, index: usize, with: char) -> String {
        let (message, signature) = token.rsplit_once('.').expect("three segments");
        let mut chars: Vec<char> = signature.chars().collect();
        chars[index] = with;
        format!("{}.{}", message, chars.into_iter().collect::<String>())
    }

    #[test]
    fn test_flipped_signature_is_bad_signature() {
        let service = create_test_service();
        let token = service.mint(5).expect("should mint");

        let first = token.rsplit_once('.').expect("three segments").1.chars().next().unwrap();
        let tampered = replace_signature_char(&token, 0, if first == 'A' { 'B' } else { 'A' });

        assert_eq!(service.verify(&tampered), Err(AuthFailure::BadSignature));
    }

    #[test]
    fn test_any_last_signature_char_is_bad_signature() {
        let service = create_test_service();

        for subject in 1..=20 {
            let token = service.mint_at(subject, t0()).expect("should mint");
            let signature = token.rsplit_once('.').expect("three segments").1;
            let last_index = signature.chars().count() - 1;
            let last = signature.chars().last().unwrap();

            // Some of these leave non-zero trailing bits, which is invalid base64
            for replacement in ['A', 'B', 'C', 'D', 'Q', 'g', 'w', '_'] {
                if replacement == last {
                    continue;
                }
                let tampered = replace_signature_char(&token, last_index, replacement);
                assert_eq!(
                    service.verify_at(&tampered, t0()),
                    Err(AuthFailure::BadSignature),
                    "subject {} with last char {:?}",
                    subject,
                    replacement
                );
            }
        }
    }

    #[test]
    fn test_garbage_signature_segment_is_bad_signature() {
        let service = create_test_service();
        let token = service.mint_at(5, t0()).expect("should mint");
        let (message, _) = token.rsplit_once('.').expect("three segments");

        for signature in ["", "%%%", "not-a-signature"] {
            let tampered = format!("{}.{}", message, signature);
            assert_eq!(
                service.verify_at(&tampered, t0()),
                Err(AuthFailure::BadSignature),
                "signature {:?}",
                signature
            );
        }
    }

    #[test]
    fn test_unreadable_payload_is_malformed() {
        let service = create_test_service();
        let token = service.mint_at(5, t0()).expect("should mint");
        let parts: Vec<&str> = token.split('.').collect();

        let not_json = Base64UrlUnpadded::encode_string(b"not json");
        let not_object = Base64UrlUnpadded::encode_string(b"[1, 2, 3]");

        for payload in ["%%%not-base64%%%", not_json.as_str(), not_object.as_str()] {
            let tampered = format!("{}.{}.{}", parts[0], payload, parts[2]);
            assert_eq!(
                service.verify_at(&tampered, t0()),
                Err(AuthFailure::Malformed),
                "payload {:?}",
                payload
            );
        }
    }

    #[test]
    fn test_unreadable_header_is_malformed() {
        let service = create_test_service();
        let token = service.mint_at(5, t0()).expect("should mint");
        let (_, rest) = token.split_once('.').expect("three segments");

        let tampered = format!("%%%.{}", rest);
        assert_eq!(service.verify_at(&tampered, t0()), Err(AuthFailure::Malformed));
    }

    #[test]
    fn test_out_of_range_lifetime_fails_to_mint() {
        let service = TokenService::new(
            SigningSecret::new("test-secret-key-that-is-at-least-32-chars"),
            Duration::MAX,
        );

        assert!(matches!(service.mint(1), Err(AppError::Internal(_))));
    }

    #[test]
    fn test_altered_claims_are_bad_signature() {
        let service = create_test_service();
        let token = service.mint_at(5, t0()).expect("should mint");
        let forged_payload = sign(serde_json::json!({
            "sub": "6",
            "iat": t0().timestamp(),
            "exp": t0().timestamp() + 1800,
        }));

        // Splice the forged payload onto the original signature.
        let mut original: Vec<&str> = token.split('.').collect();
        let forged: Vec<&str> = forged_payload.split('.').collect();
        original[1] = forged[1];
        let spliced = original.join(".");

        assert_eq!(
            service.verify_at(&spliced, t0()),
            Err(AuthFailure::BadSignature)
        );
    }

    #[test]
    fn test_token_verification_invalid_token() {
        let service = create_test_service();

        for token in ["", "invalid", "invalid.token", "invalid.token.here", "a.b.c.d"] {
            assert_eq!(
                service.verify(token),
                Err(AuthFailure::Malformed),
                "{:?} should be malformed",
                token
            );
        }
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let service = create_test_service();
        let claims = serde_json::json!({
            "sub": "1",
            "iat": t0().timestamp(),
            "exp": t0().timestamp() + 60,
        });
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key-that-is-at-least-32-chars"),
        )
        .expect("should encode");

        assert_eq!(
            service.verify_at(&token, t0()),
            Err(AuthFailure::BadSignature)
        );
    }

    #[test]
    fn test_missing_subject_is_malformed() {
        let service = create_test_service();
        let token = sign(serde_json::json!({
            "iat": t0().timestamp(),
            "exp": t0().timestamp() + 60,
        }));

        assert_eq!(service.verify_at(&token, t0()), Err(AuthFailure::Malformed));
    }

    #[test]
    fn test_non_numeric_subject_is_malformed() {
        let service = create_test_service();
        for sub in [serde_json::json!("alice"), serde_json::json!(true)] {
            let token = sign(serde_json::json!({
                "sub": sub,
                "iat": t0().timestamp(),
                "exp": t0().timestamp() + 60,
            }));

            assert_eq!(service.verify_at(&token, t0()), Err(AuthFailure::Malformed));
        }
    }

    #[test]
    fn test_missing_expiry_is_malformed() {
        let service = create_test_service();
        let token = sign(serde_json::json!({ "sub": "3" }));

        assert_eq!(service.verify_at(&token, t0()), Err(AuthFailure::Malformed));
    }

    #[test]
    fn test_expiry_checked_before_subject() {
        let service = create_test_service();
        let token = sign(serde_json::json!({
            "sub": "not-a-number",
            "exp": t0().timestamp() - 1,
        }));

        assert_eq!(service.verify_at(&token, t0()), Err(AuthFailure::Expired));
    }

    #[test]
    fn test_free_functions_round_trip() {
        let secret = SigningSecret::new("free-function-secret-of-32-bytes!");
        let token = mint_token(11, &secret, Duration::minutes(5)).expect("should mint");

        assert_eq!(verify_token(&token, &secret), Ok(11));
        assert_eq!(
            verify_token(&token, &SigningSecret::new("another-secret")),
            Err(AuthFailure::BadSignature)
        );
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let service = create_test_service();
        let printed = format!("{:?}", service);

        assert!(!printed.contains("test-secret-key"));
        assert!(printed.contains("REDACTED"));
    }
}

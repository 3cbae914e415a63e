use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey, LineEnding};
use rsa::pkcs8::DecodePrivateKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::{JwtAlgorithm, JwtConfig};
use crate::domains::tickets::{PlayerAttributes, ServerInfo};

const RSA_KEY_BITS: usize = 2048;

/// Access token claims handed to a matched player.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AccessClaims {
    pub ticket_id: String,
    pub server: ServerInfo,
    pub player: PlayerAttributes,
    pub iat: i64, // Issued at timestamp
    pub exp: i64, // Expiration timestamp
}

/// Signs access tokens, HS256 with a shared secret or RS256 with a key pair.
#[derive(Clone)]
pub struct TokenSigner {
    algorithm: JwtAlgorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    jwks: Option<JwkSet>,
    expiration_minutes: i64,
}

impl TokenSigner {
    pub fn hs256(secret: &str, expiration_minutes: i64) -> Self {
        Self {
            algorithm: JwtAlgorithm::Hs256,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            header: Header::new(Algorithm::HS256),
            jwks: None,
            expiration_minutes,
        }
    }

    /// RS256 from a PKCS#1 or PKCS#8 PEM private key.
    pub fn rs256_from_pem(pem: &str, expiration_minutes: i64) -> Result<Self> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .context("Failed to parse RSA private key")?;

        let n = URL_SAFE_NO_PAD.encode(private_key.n().to_bytes_be());
        let e = URL_SAFE_NO_PAD.encode(private_key.e().to_bytes_be());
        let kid = key_id(&private_key.n().to_bytes_be());

        let jwks: JwkSet = serde_json::from_value(serde_json::json!({
            "keys": [{
                "kty": "RSA",
                "use": "sig",
                "alg": "RS256",
                "kid": kid,
                "n": n,
                "e": e,
            }]
        }))
        .context("Failed to build JWK set")?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid);

        Ok(Self {
            algorithm: JwtAlgorithm::Rs256,
            encoding_key: EncodingKey::from_rsa_pem(pem.as_bytes())
                .context("Failed to load RSA signing key")?,
            decoding_key: DecodingKey::from_rsa_components(&n, &e)
                .context("Failed to load RSA verification key")?,
            header,
            jwks: Some(jwks),
            expiration_minutes,
        })
    }

    /// RS256 with a fresh 2048-bit key pair.
    pub fn rs256_generate(expiration_minutes: i64) -> Result<Self> {
        let private_key = RsaPrivateKey::new(&mut rand::thread_rng(), RSA_KEY_BITS)
            .context("Failed to generate RSA key pair")?;
        let pem = private_key
            .to_pkcs1_pem(LineEnding::LF)
            .context("Failed to encode RSA key pair")?;

        Self::rs256_from_pem(&pem, expiration_minutes)
    }

    pub fn from_config(config: &JwtConfig) -> Result<Self> {
        match config.algorithm {
            JwtAlgorithm::Hs256 => Ok(Self::hs256(&config.secret, config.expiration_minutes)),
            JwtAlgorithm::Rs256 => match &config.private_key_path {
                Some(path) => {
                    let pem = std::fs::read_to_string(path).with_context(|| {
                        format!("Failed to read JWT private key {}", path.display())
                    })?;
                    tracing::info!(path = %path.display(), "Loaded RS256 signing key");
                    Self::rs256_from_pem(&pem, config.expiration_minutes)
                }
                None => {
                    tracing::info!("Generating RS256 signing key pair");
                    Self::rs256_generate(config.expiration_minutes)
                }
            },
        }
    }

    pub fn algorithm(&self) -> JwtAlgorithm {
        self.algorithm
    }

    /// Public key set, RS256 only.
    pub fn jwks(&self) -> Option<&JwkSet> {
        self.jwks.as_ref()
    }

    pub fn issue(
        &self,
        ticket_id: &str,
        server: &ServerInfo,
        player: &PlayerAttributes,
    ) -> Result<String> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::minutes(self.expiration_minutes);

        let claims = AccessClaims {
            ticket_id: ticket_id.to_string(),
            server: server.clone(),
            player: player.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&self.header, &claims, &self.encoding_key).context("Failed to sign access token")
    }

    /// Verify and decode a token signed by this signer
    pub fn verify(&self, token: &str) -> Result<AccessClaims> {
        let validation = Validation::new(self.header.alg);

        decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }
}

/// Short stable id for a public key: first 16 hex chars of SHA-256(n).
fn key_id(modulus: &[u8]) -> String {
    let digest = Sha256::digest(modulus);
    hex::encode(&digest[..8])
}

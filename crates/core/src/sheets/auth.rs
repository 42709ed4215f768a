use crate::sheets::error::SheetsApiError;
use anyhow::{Context, Result};
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use ring::signature::RsaKeyPair;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SHEETS_SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// The fields of a Google service-account key file that token exchange needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Serialize)]
struct JwtHeader<'a> {
    alg: &'static str,
    typ: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: i64,
    iat: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: u64,
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read service account key {}", path.display()))?;
        Self::try_from_str(&text)
            .with_context(|| format!("invalid service account key {}", path.display()))
    }

    pub fn try_from_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).context("failed to deserialize service account key JSON")
    }

    /// RS256-signed assertion for the OAuth JWT bearer grant, valid for one hour from `now`.
    pub fn signed_jwt(&self, scope: &str, now: DateTime<Utc>) -> Result<String> {
        let header = JwtHeader {
            alg: "RS256",
            typ: "JWT",
            kid: self.private_key_id.as_deref(),
        };
        let claims = JwtClaims {
            iss: &self.client_email,
            scope,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let header_b64 = BASE64_URL_SAFE_NO_PAD
            .encode(serde_json::to_vec(&header).context("failed to encode jwt header")?);
        let claims_b64 = BASE64_URL_SAFE_NO_PAD
            .encode(serde_json::to_vec(&claims).context("failed to encode jwt claims")?);
        let signing_input = format!("{header_b64}.{claims_b64}");

        let key_pair = self.key_pair()?;
        let mut signature = vec![0; key_pair.public().modulus_len()];
        key_pair
            .sign(
                &ring::signature::RSA_PKCS1_SHA256,
                &ring::rand::SystemRandom::new(),
                signing_input.as_bytes(),
                &mut signature,
            )
            .map_err(|_| anyhow::anyhow!("failed to sign jwt"))?;

        Ok(format!(
            "{signing_input}.{}",
            BASE64_URL_SAFE_NO_PAD.encode(&signature)
        ))
    }

    fn key_pair(&self) -> Result<RsaKeyPair> {
        let mut reader = std::io::Cursor::new(self.private_key.as_bytes());
        let item = rustls_pemfile::read_one(&mut reader).context("invalid PEM private key")?;
        match item {
            Some(rustls_pemfile::Item::Pkcs8Key(der)) => {
                RsaKeyPair::from_pkcs8(der.secret_pkcs8_der())
                    .map_err(|e| anyhow::anyhow!("rejected pkcs8 private key: {e}"))
            }
            Some(rustls_pemfile::Item::Pkcs1Key(der)) => {
                RsaKeyPair::from_der(der.secret_pkcs1_der())
                    .map_err(|e| anyhow::anyhow!("rejected pkcs1 private key: {e}"))
            }
            _ => anyhow::bail!("service account key has no RSA private key"),
        }
    }

    pub async fn fetch_access_token(
        &self,
        http: &reqwest::Client,
        scope: &str,
    ) -> Result<AccessToken> {
        let jwt = self.signed_jwt(scope, Utc::now())?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", jwt.as_str())];

        let res = http
            .post(&self.token_uri)
            .form(&params)
            .send()
            .await
            .context("Google token request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Google token response")?;
        if !status.is_success() {
            return Err(SheetsApiError {
                stage: "token",
                status: status.as_u16(),
                body: text,
            }
            .into());
        }

        serde_json::from_str::<AccessToken>(&text).context("failed to parse Google token response")
    }
}

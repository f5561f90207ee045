use reqwest::Client;
use serde::Deserialize;

use crate::error::{Error, Result};

const TOKENINFO_BASE_URL: &str = "https://oauth2.googleapis.com";

/// Claims returned by Google's tokeninfo endpoint for an ID token.
/// `email_verified` arrives as the string "true"/"false".
#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    pub aud: String,
    pub sub: String,
    pub email: String,
    pub email_verified: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GoogleProfile {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

#[derive(Clone)]
pub struct GoogleService {
    client: Client,
    base_url: String,
    client_id: String,
}

impl GoogleService {
    pub fn new(client: Client, client_id: String) -> Self {
        Self {
            client,
            base_url: TOKENINFO_BASE_URL.to_string(),
            client_id,
        }
    }

    /// Verifies a Google ID token by asking Google's tokeninfo endpoint and
    /// checking the audience against our own client id.
    pub async fn verify_id_token(&self, id_token: &str) -> Result<GoogleProfile> {
        let url = format!("{}/tokeninfo", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("id_token", id_token)])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::BAD_REQUEST {
            return Err(Error::Unauthorized("Invalid Google token".to_string()));
        }

        let info = response.error_for_status()?.json::<TokenInfo>().await?;
        profile_from_token_info(info, &self.client_id)
    }
}

fn profile_from_token_info(info: TokenInfo, expected_audience: &str) -> Result<GoogleProfile> {
    if info.aud != expected_audience {
        return Err(Error::Unauthorized(
            "Google token was issued for a different application".to_string(),
        ));
    }

    if info.email_verified.as_deref() != Some("true") {
        return Err(Error::Unauthorized(
            "Google account email is not verified".to_string(),
        ));
    }

    let name = info.name.unwrap_or_else(|| {
        info.email
            .split('@')
            .next()
            .unwrap_or(info.email.as_str())
            .to_string()
    });

    Ok(GoogleProfile {
        sub: info.sub,
        email: info.email,
        name,
        picture: info.picture,
    })
}

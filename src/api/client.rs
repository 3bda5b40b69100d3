//! Privacy API HTTP client.

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::{header, Client, Response};

use crate::api::types::*;
use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::hls::ContentToken;

/// Service API base URL.
const SERVICE_BASE: &str = "https://service.privacy.com.br";

/// Website base URL.
const SITE_BASE: &str = "https://privacy.com.br";

/// Followed profiles requested per page.
pub const PROFILES_PAGE_SIZE: usize = 30;

/// Posts requested per feed page.
pub const POSTS_PAGE_SIZE: usize = 50;

/// Lifetime requested for video content tokens, in seconds.
const VIDEO_TOKEN_TTL: u64 = 3600;

/// Privacy API client holding an authenticated session.
pub struct PrivacyApi {
    client: Client,
    bearer: String,
    service_base: String,
    site_base: String,
}

impl PrivacyApi {
    /// Build the shared HTTP client with browser-like default headers and a
    /// cookie store.
    pub fn build_client(http: &HttpConfig) -> Result<Client> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        headers.insert(header::ORIGIN, http.origin.parse()?);
        headers.insert(header::REFERER, http.referer.parse()?);

        Client::builder()
            .user_agent(&http.user_agent)
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))
    }

    /// Log in with email and password, then bind the session cookies.
    pub async fn login(client: Client, email: &str, password: &str) -> Result<Self> {
        let url = format!("{}/auth/login", SERVICE_BASE);
        let body = LoginRequest {
            email,
            password,
            document: None,
            locale: "pt-BR",
            can_receive_email: true,
        };

        tracing::debug!("POST {}", url);
        let response = client.post(&url).json(&body).send().await?;
        let response = check_status(response).await?;
        let text = response.text().await?;

        let tokens: LoginResponse = serde_json::from_str(&text).map_err(|e| {
            Error::Authentication(format!("Unexpected login response: {} - {}", e, text))
        })?;

        let (token_v1, token_v2) = match (tokens.token_v1, tokens.token) {
            (Some(v1), Some(v2)) if !v1.is_empty() && !v2.is_empty() => (v1, v2),
            _ => {
                return Err(Error::Authentication(
                    "Login response did not contain session tokens".into(),
                ))
            }
        };

        let api = Self::with_token(client, token_v2);
        api.authorize(&token_v1).await?;

        Ok(api)
    }

    /// Use a previously issued bearer token instead of logging in.
    pub fn with_token(client: Client, token: impl Into<String>) -> Self {
        Self {
            client,
            bearer: token.into(),
            service_base: SERVICE_BASE.to_string(),
            site_base: SITE_BASE.to_string(),
        }
    }

    /// Point the session at other service and website hosts.
    pub fn with_base_urls(mut self, service: impl Into<String>, site: impl Into<String>) -> Self {
        self.service_base = service.into().trim_end_matches('/').to_string();
        self.site_base = site.into().trim_end_matches('/').to_string();
        self
    }

    /// The HTTP client this session runs on.
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    /// Exchange both tokens for website session cookies.
    async fn authorize(&self, token_v1: &str) -> Result<()> {
        let url = format!("{}/strangler/Authorize", self.site_base);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("TokenV1", token_v1), ("TokenV2", self.bearer.as_str())])
            .send()
            .await?;
        check_status(response).await?;

        tracing::debug!("Session tokens authorized");
        Ok(())
    }

    /// Make an authenticated GET request.
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&self.bearer)
            .send()
            .await?;

        tracing::debug!("Response status: {}", response.status());
        check_status(response).await
    }

    /// Names of every profile the account follows, across all pages.
    pub async fn get_profiles(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = Vec::new();
        let mut page = 0usize;

        loop {
            let batch = self.get_profiles_page(page).await?;
            let fetched = batch.len();
            let before = names.len();

            for name in batch {
                if !names.contains(&name) {
                    names.push(name);
                }
            }

            tracing::debug!("Profiles page {}: {} entries", page, fetched);

            // A repeated page means the server ignored the page number
            if fetched < PROFILES_PAGE_SIZE || names.len() == before {
                break;
            }
            page += 1;
        }

        Ok(names)
    }

    async fn get_profiles_page(&self, page: usize) -> Result<Vec<String>> {
        let url = format!("{}/profile/UserFollowing", self.service_base);
        let query = [
            ("page", page.to_string()),
            ("limit", PROFILES_PAGE_SIZE.to_string()),
            ("nickName", String::new()),
        ];

        let text = self.get(&url, &query).await?.text().await?;
        let profiles: Vec<FollowedProfile> = serde_json::from_str(&text).map_err(|e| {
            Error::Api(format!("Failed to parse profiles: {} - Response: {}", e, text))
        })?;

        Ok(profiles.into_iter().map(|p| p.profile_name).collect())
    }

    /// One page of a profile's posts, starting at `skip`.
    pub async fn get_posts(&self, profile: &str, skip: usize) -> Result<PostsPage> {
        let url = format!("{}/Profile", self.site_base);
        let query = [
            ("handler", "PartialPosts".to_string()),
            ("skip", skip.to_string()),
            ("take", POSTS_PAGE_SIZE.to_string()),
            ("nomePerfil", profile.to_string()),
            ("filter", "mosaico".to_string()),
            ("_", unix_millis().to_string()),
        ];

        let text = self.get(&url, &query).await?.text().await?;
        tracing::debug!("Posts response length: {} bytes", text.len());

        serde_json::from_str(&text).map_err(|e| {
            Error::Api(format!(
                "Failed to parse posts: {} - Response: {}",
                e,
                &text[..floor_char_boundary(&text, 500)]
            ))
        })
    }

    /// Request the short-lived content token for one video file.
    pub async fn get_video_token(&self, file_id: &str) -> Result<ContentToken> {
        let url = format!("{}/media/video/token", self.service_base);
        tracing::debug!("POST {} (file {})", url, file_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.bearer)
            .json(&VideoTokenRequest {
                exp: VIDEO_TOKEN_TTL,
                file_id,
            })
            .send()
            .await?;
        let text = check_status(response).await?.text().await?;

        let token: VideoTokenResponse = serde_json::from_str(&text).map_err(|e| {
            Error::Api(format!(
                "Failed to parse video token: {} - Response: {}",
                e, text
            ))
        })?;

        token
            .content
            .filter(|c| !c.is_empty())
            .map(ContentToken::new)
            .ok_or_else(|| Error::Api(format!("No video token issued for file {}", file_id)))
    }
}

/// Map auth failures and other non-success statuses to errors.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();

    if status == 401 || status == 403 {
        let body = response.text().await.unwrap_or_default();
        tracing::error!("Auth error response: {}", body);
        return Err(Error::Authentication(format!(
            "HTTP {}: {}",
            status,
            if body.is_empty() {
                "Authentication failed"
            } else {
                &body
            }
        )));
    }

    if !status.is_success() {
        return Err(Error::Api(format!("HTTP {}", status)));
    }

    Ok(response)
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

fn floor_char_boundary(text: &str, max: usize) -> usize {
    let mut end = text.len().min(max);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    end
}

// ============================================================================
// reelstitch-core/src/upload.rs
// ============================================================================
//
// UPLOAD GATEWAY: Scheduled Private Uploads
//
// The scheduler talks to the platform through the `Uploader` trait: one call
// per artifact, carrying fixed metadata and the publish slot, returning the
// platform's id for the new video.
//
// `YouTubeUploader` implements it over the YouTube Data API v3 with a
// blocking reqwest client:
//
// 1. Exchange the stored refresh token for an access token
// 2. Open a resumable upload session with the video's metadata
// 3. Send the file body to the session URL and read back the video id
//
// The credential files are produced beforehand by Google's installed-app
// OAuth flow; this module only consumes them.

use crate::config::ScheduleConfig;
use crate::error::{CoreError, CoreResult};

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use reqwest::StatusCode;
use reqwest::blocking::{Body, Client};
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use serde::Deserialize;
use serde_json::json;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

/// Default OAuth token endpoint, used when the client secrets omit one.
pub const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Resumable upload endpoint for new videos.
pub const UPLOAD_ENDPOINT: &str =
    "https://www.googleapis.com/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status";

const USER_AGENT: &str = concat!("reelstitch/", env!("CARGO_PKG_VERSION"));

/// Everything the platform needs to schedule one artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
    pub publish_at: DateTime<FixedOffset>,
}

impl UploadRequest {
    /// Request with the configured fixed metadata and the given slot.
    pub fn from_config(config: &ScheduleConfig, publish_at: DateTime<FixedOffset>) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            tags: config.tags.clone(),
            category_id: config.category_id.clone(),
            publish_at,
        }
    }

    /// Video resource body: private now, published at the slot.
    pub fn metadata(&self) -> serde_json::Value {
        json!({
            "snippet": {
                "title": self.title,
                "description": self.description,
                "tags": self.tags,
                "categoryId": self.category_id,
            },
            "status": {
                "privacyStatus": "private",
                "publishAt": self
                    .publish_at
                    .with_timezone(&Utc)
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
                "selfDeclaredMadeForKids": false,
            },
        })
    }
}

/// Submits one artifact for future publication.
pub trait Uploader {
    /// Uploads `file` as a private video scheduled for `request.publish_at`
    /// and returns the platform's video id.
    fn schedule_upload(&self, file: &Path, request: &UploadRequest) -> CoreResult<String>;
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

#[derive(Deserialize)]
struct ClientSecrets {
    client_id: String,
    client_secret: String,
    token_uri: Option<String>,
}

#[derive(Deserialize)]
struct StoredToken {
    refresh_token: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct VideoResource {
    id: String,
}

/// OAuth client and refresh token needed to act on the channel.
#[derive(Clone)]
pub struct YouTubeCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub token_uri: String,
}

impl std::fmt::Debug for YouTubeCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeCredentials")
            .field("client_id", &self.client_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl YouTubeCredentials {
    /// Loads client secrets (`credentials.json`) and the stored token
    /// (`token.json`).
    ///
    /// # Errors
    ///
    /// `CoreError::Credentials` when either file is missing, unreadable, or
    /// lacks the required fields.
    pub fn load(credentials_path: &Path, token_path: &Path) -> CoreResult<Self> {
        let secrets_file: ClientSecretsFile = read_json(credentials_path)?;
        let secrets = secrets_file.installed.or(secrets_file.web).ok_or_else(|| {
            CoreError::Credentials(format!(
                "{} has no \"installed\" or \"web\" client section",
                credentials_path.display()
            ))
        })?;

        let token: StoredToken = read_json(token_path)?;
        let refresh_token = token
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                CoreError::Credentials(format!("{} has no refresh_token", token_path.display()))
            })?;

        Ok(Self {
            client_id: secrets.client_id,
            client_secret: secrets.client_secret,
            refresh_token,
            token_uri: secrets.token_uri.unwrap_or_else(|| TOKEN_ENDPOINT.to_string()),
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> CoreResult<T> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| CoreError::Credentials(format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| CoreError::Credentials(format!("{} is not valid: {}", path.display(), e)))
}

/// YouTube Data API v3 uploader.
pub struct YouTubeUploader {
    http: Client,
    credentials: YouTubeCredentials,
    upload_endpoint: String,
    access_token: Mutex<Option<String>>,
}

impl YouTubeUploader {
    pub fn new(credentials: YouTubeCredentials) -> CoreResult<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(30))
            // Body transfers of large files must not be cut off.
            .timeout(None)
            .build()
            .map_err(|e| CoreError::Upload(format!("could not build HTTP client: {e}")))?;
        Ok(Self {
            http,
            credentials,
            upload_endpoint: UPLOAD_ENDPOINT.to_string(),
            access_token: Mutex::new(None),
        })
    }

    /// Sends upload sessions to `endpoint` instead of the YouTube API.
    #[must_use]
    pub fn with_upload_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.upload_endpoint = endpoint.into();
        self
    }

    /// Loads credentials from disk and builds the uploader.
    pub fn from_files(credentials_path: &Path, token_path: &Path) -> CoreResult<Self> {
        Self::new(YouTubeCredentials::load(credentials_path, token_path)?)
    }

    fn access_token(&self, force_refresh: bool) -> CoreResult<String> {
        let mut cached = self.access_token.lock().unwrap_or_else(|e| e.into_inner());
        if !force_refresh {
            if let Some(token) = cached.as_ref() {
                return Ok(token.clone());
            }
        }
        let token = self.refresh_access_token()?;
        *cached = Some(token.clone());
        Ok(token)
    }

    fn refresh_access_token(&self) -> CoreResult<String> {
        log::debug!("Refreshing access token at {}", self.credentials.token_uri);
        let response = self
            .http
            .post(&self.credentials.token_uri)
            .form(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", self.credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .map_err(|e| CoreError::Upload(format!("token refresh request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CoreError::Credentials(format!(
                "token refresh rejected ({status}): {body}"
            )));
        }
        let token: TokenResponse = response
            .json()
            .map_err(|e| CoreError::Upload(format!("unexpected token response: {e}")))?;
        Ok(token.access_token)
    }

    /// Opens a resumable session and returns its upload URL.
    fn start_session(&self, file_len: u64, request: &UploadRequest) -> CoreResult<String> {
        let mut force_refresh = false;
        loop {
            let token = self.access_token(force_refresh)?;
            let response = self
                .http
                .post(&self.upload_endpoint)
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .header("X-Upload-Content-Type", "video/*")
                .header("X-Upload-Content-Length", file_len)
                .json(&request.metadata())
                .send()
                .map_err(|e| CoreError::Upload(format!("could not start upload session: {e}")))?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED && !force_refresh {
                log::debug!("Access token rejected, refreshing once");
                force_refresh = true;
                continue;
            }
            if !status.is_success() {
                let body = response.text().unwrap_or_default();
                return Err(CoreError::Upload(format!(
                    "upload session rejected ({status}): {body}"
                )));
            }
            return response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| CoreError::Upload("upload session has no Location header".to_string()));
        }
    }
}

impl Uploader for YouTubeUploader {
    fn schedule_upload(&self, file: &Path, request: &UploadRequest) -> CoreResult<String> {
        let handle = File::open(file)?;
        let file_len = handle.metadata()?.len();
        let session_url = self.start_session(file_len, request)?;
        log::debug!("Upload session opened for {}", file.display());

        let token = self.access_token(false)?;
        let response = self
            .http
            .put(&session_url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, "video/*")
            .header(CONTENT_LENGTH, file_len)
            .body(Body::sized(handle, file_len))
            .send()
            .map_err(|e| CoreError::Upload(format!("sending {} failed: {}", file.display(), e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CoreError::Upload(format!(
                "{} was rejected ({status}): {body}",
                file.display()
            )));
        }
        let video: VideoResource = response
            .json()
            .map_err(|e| CoreError::Upload(format!("unexpected upload response: {e}")))?;
        Ok(video.id)
    }
}

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::misc::Version;
use crate::models::{
    AIStatus, ChatCompletion, ChatCompletionRequest, ModelDesc, ModelList, Transcription,
    TranscriptionRequest,
};

/// Client for an edgen server.
///
/// Building one never touches the network; an unreachable server only shows
/// up as [`Error::Connection`] once a call is made.
#[derive(Debug, Clone)]
pub struct Edgen {
    http: Client,
    config: Config,
}

impl Default for Edgen {
    fn default() -> Self {
        Edgen::new()
    }
}

impl Edgen {
    /// Client configured from the `EDGEN_*` environment variables.
    pub fn new() -> Self {
        Edgen::with_config(Config::from_env())
    }

    pub fn with_config(config: Config) -> Self {
        Edgen {
            http: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// `POST /v1/chat/completions` without streaming.
    pub async fn chat_completion(&self, mut request: ChatCompletionRequest) -> Result<ChatCompletion> {
        request.stream = false;
        let url = self.config.endpoint("chat/completions");
        log::debug!("POST {} ({} messages)", url, request.messages.len());
        let response = self.send(&url, self.http.post(&url).json(&request)).await?;
        decode(&url, response).await
    }

    /// `GET /v1/chat/completions/status`
    pub async fn chat_completions_status(&self) -> Result<AIStatus> {
        self.get_json("chat/completions/status").await
    }

    /// `GET /v1/audio/transcriptions/status`
    pub async fn audio_transcriptions_status(&self) -> Result<AIStatus> {
        self.get_json("audio/transcriptions/status").await
    }

    /// Uploads the audio file at `path` to `POST /v1/audio/transcriptions`.
    pub async fn transcription(&self, model: &str, path: &Path) -> Result<Transcription> {
        self.transcription_with(TranscriptionRequest::new(model, path))
            .await
    }

    /// Transcription with the optional settings of [`TranscriptionRequest`].
    pub async fn transcription_with(&self, request: TranscriptionRequest) -> Result<Transcription> {
        let path = request.file.as_path();
        let audio = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());

        let part = Part::bytes(audio)
            .file_name(file_name)
            .mime_str(audio_mime(path))?;
        let mut form = Form::new().part("file", part);
        for (name, value) in request.text_fields() {
            form = form.text(name, value);
        }

        let url = self.config.endpoint("audio/transcriptions");
        log::debug!("POST {} ({})", url, path.display());
        let response = self.send(&url, self.http.post(&url).multipart(form)).await?;
        decode(&url, response).await
    }

    /// `GET /v1/misc/version`
    pub async fn version(&self) -> Result<Version> {
        self.get_json("misc/version").await
    }

    /// `GET /v1/models`
    pub async fn models(&self) -> Result<ModelList> {
        self.get_json("models").await
    }

    /// `GET /v1/models/{id}`. The id travels as one path segment, so its `/`
    /// is sent as `%2F`.
    pub async fn model(&self, id: &str) -> Result<ModelDesc> {
        let url = self.config.endpoint_with_segment("models", id)?;
        self.get_json_at(&url).await
    }

    /// Sends `request` and turns transport failures and non-2xx answers into errors.
    pub(crate) async fn send(&self, url: &str, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("{} answered {}", url, status);
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_json_at(&self.config.endpoint(path)).await
    }

    async fn get_json_at<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        log::debug!("GET {}", url);
        let response = self.send(url, self.http.get(url)).await?;
        decode(url, response).await
    }
}

async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T> {
    let body = response
        .bytes()
        .await
        .map_err(|e| Error::transport(url, e))?;
    log::trace!("{} -> {}", url, String::from_utf8_lossy(&body));
    Ok(serde_json::from_slice(&body)?)
}

fn audio_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("ogg") => "audio/ogg",
        Some("flac") => "audio/flac",
        _ => "application/octet-stream",
    }
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Message {
            role: role.to_string(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Message::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message::new("assistant", content)
    }
}

/// Body of `POST /v1/chat/completions`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        ChatCompletionRequest {
            model: model.into(),
            messages,
            stream: false,
            max_tokens: None,
            temperature: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatCompletion {
    #[serde(default)]
    pub id: String,
    pub choices: Vec<ChatCompletionChoice>,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatCompletion {
    /// Content of the first choice, if the model produced any.
    pub fn content(&self) -> Option<&str> {
        self.choices.first()?.message.content.as_deref()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatCompletionChoice {
    #[serde(default)]
    pub index: i32,
    pub message: ChatCompletionMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatCompletionMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    pub completion_tokens: u32,
    pub prompt_tokens: u32,
    pub total_tokens: u32,
}

/// One increment of a streamed chat completion.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Chunk {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub model: String,
}

impl Chunk {
    /// Text carried by the first choice. `None` for chunks without choices or content.
    pub fn content(&self) -> Option<&str> {
        self.choices.first()?.delta.content.as_deref()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub delta: Delta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Delta {
    #[serde(default)]
    pub role: Option<String>,
    pub content: Option<String>,
}

/// Multipart form of `POST /v1/audio/transcriptions`. Unset options are not sent.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionRequest {
    pub file: PathBuf,
    pub model: String,
    /// ISO-639-1 code of the spoken language.
    pub language: Option<String>,
    /// Text to guide the model's style or continue a previous segment.
    pub prompt: Option<String>,
    pub response_format: Option<String>,
    pub temperature: Option<f32>,
    /// Ask edgen to open a session; its id comes back in [`Transcription::session`].
    pub create_session: Option<bool>,
    /// Continue an existing session.
    pub session: Option<String>,
}

impl TranscriptionRequest {
    pub fn new(model: impl Into<String>, file: impl AsRef<Path>) -> Self {
        TranscriptionRequest {
            file: file.as_ref().to_path_buf(),
            model: model.into(),
            language: None,
            prompt: None,
            response_format: None,
            temperature: None,
            create_session: None,
            session: None,
        }
    }

    /// Text parts of the form, everything except the file.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("model", self.model.clone())];
        let optional = [
            ("language", self.language.clone()),
            ("prompt", self.prompt.clone()),
            ("response_format", self.response_format.clone()),
            ("temperature", self.temperature.map(|t| t.to_string())),
            ("create_session", self.create_session.map(|b| b.to_string())),
            ("session", self.session.clone()),
        ];
        fields.extend(
            optional
                .into_iter()
                .filter_map(|(name, value)| value.map(|value| (name, value))),
        );
        fields
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Transcription {
    pub text: String,
    /// Only present when the server was asked to open a session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

/// Model descriptor as listed by `GET /v1/models`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ModelDesc {
    pub id: String,
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub owned_by: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelListKind {
    Page,
    Plain,
}

/// Models endpoint response. Edgen answers with a bare array, OpenAI-style
/// servers wrap it in a `{"object": "list", "data": [...]}` page.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ModelList {
    Plain(Vec<ModelDesc>),
    Page {
        #[serde(default)]
        object: String,
        data: Vec<ModelDesc>,
    },
}

impl ModelList {
    pub fn kind(&self) -> ModelListKind {
        match self {
            ModelList::Page { .. } => ModelListKind::Page,
            ModelList::Plain(_) => ModelListKind::Plain,
        }
    }

    pub fn as_slice(&self) -> &[ModelDesc] {
        match self {
            ModelList::Page { data, .. } => data,
            ModelList::Plain(models) => models,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModelDesc> {
        self.as_slice().iter()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn into_vec(self) -> Vec<ModelDesc> {
        match self {
            ModelList::Page { data, .. } => data,
            ModelList::Plain(models) => models,
        }
    }
}

impl<'a> IntoIterator for &'a ModelList {
    type Item = &'a ModelDesc;
    type IntoIter = std::slice::Iter<'a, ModelDesc>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Recent activity on an endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub enum Activity {
    ChatCompletions,
    AudioTranscriptions,
    Download,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub enum ActivityResult {
    Success,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Status of an AI endpoint, e.g. `GET /v1/chat/completions/status`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct AIStatus {
    pub active_model: String,
    pub last_activity: Activity,
    pub last_activity_result: ActivityResult,
    pub completions_ongoing: bool,
    pub download_ongoing: bool,
    pub last_errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chunk_without_choices_has_no_content() {
        let chunk: Chunk = serde_json::from_value(json!({
            "id": "x", "choices": [], "created": 1, "model": "m",
            "system_fingerprint": "", "object": "text_completion"
        }))
        .unwrap();
        assert_eq!(chunk.content(), None);

        let chunk: Chunk = serde_json::from_value(json!({
            "choices": [{"index": 0, "delta": {"role": "assistant"}}]
        }))
        .unwrap();
        assert_eq!(chunk.content(), None);
    }

    #[test]
    fn chunk_content_comes_from_first_delta() {
        let chunk: Chunk = serde_json::from_value(json!({
            "choices": [{"index": 0, "delta": {"content": "Hel"}, "finish_reason": null}]
        }))
        .unwrap();
        assert_eq!(chunk.content(), Some("Hel"));
    }

    #[test]
    fn completion_reads_assistant_message() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "id": "c1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "1+2 is 3", "name": null, "tool_calls": null},
                "finish_reason": "stop"
            }],
            "created": 0,
            "model": "default",
            "system_fingerprint": "edgen",
            "object": "text_completion",
            "usage": {"completion_tokens": 4, "prompt_tokens": 9, "total_tokens": 13}
        }))
        .unwrap();
        assert_eq!(completion.content(), Some("1+2 is 3"));
        assert_eq!(completion.usage.map(|u| u.total_tokens), Some(13));
    }

    #[test]
    fn request_omits_unset_sampling_options() {
        let request = ChatCompletionRequest::new("default", vec![Message::user("hi")]);
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "default",
                "messages": [{"role": "user", "content": "hi"}],
                "stream": false
            })
        );
    }

    #[test]
    fn transcription_form_skips_unset_options() {
        let request = TranscriptionRequest::new("default", "resources/frost.wav");
        assert_eq!(request.text_fields(), vec![("model", "default".to_string())]);

        let request = TranscriptionRequest {
            language: Some("en".to_string()),
            temperature: Some(0.5),
            create_session: Some(true),
            ..TranscriptionRequest::new("default", "resources/frost.wav")
        };
        assert_eq!(
            request.text_fields(),
            vec![
                ("model", "default".to_string()),
                ("language", "en".to_string()),
                ("temperature", "0.5".to_string()),
                ("create_session", "true".to_string()),
            ]
        );
    }

    #[test]
    fn model_list_accepts_both_shapes() {
        let model = json!({"id": "TheBloke/neural-chat", "created": 7, "object": "model", "owned_by": "TheBloke"});

        let plain: ModelList = serde_json::from_value(json!([model.clone()])).unwrap();
        assert_eq!(plain.kind(), ModelListKind::Plain);
        assert_eq!(plain.len(), 1);

        let page: ModelList =
            serde_json::from_value(json!({"object": "list", "data": [model]})).unwrap();
        assert_eq!(page.kind(), ModelListKind::Page);
        assert_eq!(page.iter().next().map(|m| m.owned_by.as_str()), Some("TheBloke"));
    }

    #[test]
    fn status_tolerates_unknown_activity() {
        let status: AIStatus = serde_json::from_value(json!({
            "active_model": "neural-chat-7b-v3-3.Q4_K_M.gguf",
            "last_activity": "ImageGeneration",
            "last_activity_result": "Success",
            "completions_ongoing": false,
            "download_ongoing": false,
            "last_errors": []
        }))
        .unwrap();
        assert_eq!(status.last_activity, Activity::Unknown);
        assert_eq!(status.last_activity_result, ActivityResult::Success);
        assert_eq!(status.active_model, "neural-chat-7b-v3-3.Q4_K_M.gguf");
    }
}

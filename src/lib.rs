//! Client for the edgen inference server: chat completions (plain and
//! streamed), audio transcriptions, model listing, endpoint status and
//! server version.

pub mod client;
pub mod config;
pub mod error;
pub mod misc;
pub mod models;
pub mod openai;
pub mod similarity;

pub use client::Edgen;
pub use config::Config;
pub use error::{Error, Result};
pub use misc::Version;
pub use models::{
    AIStatus, ChatCompletion, ChatCompletionRequest, Chunk, Message, ModelDesc, ModelList,
    ModelListKind, Transcription, TranscriptionRequest,
};
pub use openai::ChatCompletionStream;
pub use similarity::similarity;

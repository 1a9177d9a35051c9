//! Shared fixture and checks of the live suite.
//!
//! Every check panics with [`NO_CONNECTION`] when the server cannot be reached.

#![allow(dead_code)]

use std::env;
use std::path::{Path, PathBuf};

use edgen_client::misc::build_system_version;
use edgen_client::{
    similarity, ChatCompletionRequest, Config, Edgen, Error, Message, ModelListKind, Result,
};

pub const NO_CONNECTION: &str = "No connection. Is edgen running?";

pub const FROST: &str = " The woods are lovely, dark and deep, \
                         but I have promises to keep \
                         and miles to go before I sleep, \
                         and miles to go before I sleep.";

pub const ARITHMETIC: &str = "What is the result of 1+2?";

pub fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

/// Client for the server named by `EDGEN_BASE_URL`.
pub fn client() -> Edgen {
    init_logging();
    Edgen::new()
}

/// Client for an address nothing listens on.
pub fn unreachable_client() -> Edgen {
    init_logging();
    Edgen::with_config(Config::default().with_base_url("http://127.0.0.1:1"))
}

pub fn frost_sample() -> PathBuf {
    match env::var("EDGEN_AUDIO_SAMPLE") {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/frost.wav"),
    }
}

pub fn connected<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) if e.is_connection() => panic!("{}", NO_CONNECTION),
        Err(e) => panic!("request failed: {}", e),
    }
}

fn arithmetic_request(client: &Edgen) -> ChatCompletionRequest {
    ChatCompletionRequest::new(client.config().model.clone(), vec![Message::user(ARITHMETIC)])
}

pub async fn check_transcription(client: &Edgen, sample: &Path) {
    let transcription = connected(client.transcription("default", sample).await);

    println!("{:?}", transcription);
    println!("{}", FROST);

    let have = transcription.text;
    let s = similarity(&have, FROST);
    println!(
        "distance: {} of '{}', similarity: {}",
        strsim::levenshtein(&have, FROST),
        have,
        s
    );
    assert!(s > 90.0, "similarity {} is not above 90%", s);
}

pub async fn check_streaming_completion(client: &Edgen) {
    let stream = connected(client.chat_completion_stream(arithmetic_request(client)).await);
    assert_eq!(stream.status(), 200);

    let answer = connected(stream.collect_content().await);
    println!("{}", answer);
}

pub async fn check_completion(client: &Edgen) {
    let completion = connected(client.chat_completion(arithmetic_request(client)).await);
    println!("{:?}", completion);

    let content = completion
        .content()
        .unwrap_or_else(|| panic!("first choice has no content: {:?}", completion));
    assert!(content.contains('3'), "'{}' does not contain 3", content);
}

pub async fn check_status(client: &Edgen) {
    let status = connected(client.chat_completions_status().await);
    println!("{:?}", status);
    assert!(!status.active_model.is_empty(), "no active model in {:?}", status);
}

pub async fn check_version(client: &Edgen) {
    let version = connected(client.version().await);
    let expected = match build_system_version(&client.config().source_dir).await {
        Ok(expected) => expected,
        Err(Error::Io(e)) => panic!("cannot ask the build system for its version: {}", e),
        Err(e) => panic!("{}", e),
    };
    println!("{} == {}", expected, version);
    assert_eq!(version.to_string(), expected);
}

pub async fn check_models(client: &Edgen) {
    let models = connected(client.models().await);
    assert_eq!(models.kind(), ModelListKind::Plain);

    for model in &models {
        println!("{:?}", model);
    }

    let again = connected(client.models().await);
    assert_eq!(again.kind(), models.kind());
}

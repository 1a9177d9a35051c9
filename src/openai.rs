//! Streamed chat completions.
//!
//! The server answers a streaming request with server-sent events, one
//! `data: {chunk}` line per increment and a final `data: [DONE]`.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::future;
use futures_util::{Stream, StreamExt};
use reqwest::{Response, StatusCode};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::client::Edgen;
use crate::error::{Error, Result};
use crate::models::{ChatCompletionRequest, Chunk};

impl Edgen {
    /// `POST /v1/chat/completions` with streaming. The returned stream yields
    /// chunks as the server produces them.
    pub async fn chat_completion_stream(
        &self,
        mut request: ChatCompletionRequest,
    ) -> Result<ChatCompletionStream> {
        request.stream = true;
        let url = self.config().endpoint("chat/completions");
        log::debug!("POST {} (streaming, {} messages)", url, request.messages.len());

        let response = self
            .send(&url, self.http().post(&url).json(&request))
            .await?;

        Ok(ChatCompletionStream {
            status: response.status(),
            inner: spawn_decoder(url, response),
        })
    }
}

/// Finite, single-pass stream of [`Chunk`]s.
pub struct ChatCompletionStream {
    status: StatusCode,
    inner: ReceiverStream<Result<Chunk>>,
}

impl ChatCompletionStream {
    /// HTTP status of the response, known before any chunk is read.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Text increments only. Chunks without choices or content are skipped.
    pub fn deltas(self) -> impl Stream<Item = Result<String>> + Unpin {
        self.filter_map(|item| {
            future::ready(match item {
                Ok(chunk) => chunk.content().map(|content| Ok(content.to_string())),
                Err(e) => Some(Err(e)),
            })
        })
    }

    /// Concatenates every increment into the full answer.
    pub async fn collect_content(self) -> Result<String> {
        let mut deltas = self.deltas();
        let mut answer = String::new();
        while let Some(delta) = deltas.next().await {
            answer.push_str(&delta?);
        }
        Ok(answer)
    }
}

impl Stream for ChatCompletionStream {
    type Item = Result<Chunk>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

fn spawn_decoder(url: String, response: Response) -> ReceiverStream<Result<Chunk>> {
    let (tx, rx) = mpsc::channel(100);
    let mut stream = response.bytes_stream();

    tokio::spawn(async move {
        let mut decoder = EventDecoder::default();
        while let Some(item) = stream.next().await {
            match item {
                Ok(bytes) => {
                    for event in decoder.push(&bytes) {
                        if !forward(&tx, event).await {
                            return;
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(Err(Error::transport(&url, e))).await;
                    return;
                }
            }
        }
        if let Some(event) = decoder.finish() {
            forward(&tx, event).await;
        }
        log::trace!("stream from {} ended", url);
    });

    ReceiverStream::new(rx)
}

// false once the stream is over or nobody listens anymore
async fn forward(tx: &mpsc::Sender<Result<Chunk>>, event: Event) -> bool {
    match event {
        Event::Done => false,
        Event::Data(json) => {
            let chunk = serde_json::from_str::<Chunk>(&json).map_err(Error::from);
            tx.send(chunk).await.is_ok()
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Event {
    Data(String),
    Done,
}

/// Splits a byte stream into SSE `data:` payloads. Lines may be cut anywhere
/// between network reads, including inside a UTF-8 sequence.
#[derive(Default)]
pub(crate) struct EventDecoder {
    buffer: Vec<u8>,
}

impl EventDecoder {
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<Event> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = parse_line(&line) {
                events.push(event);
            }
        }
        events
    }

    pub(crate) fn finish(&mut self) -> Option<Event> {
        let line = std::mem::take(&mut self.buffer);
        parse_line(&line)
    }
}

fn parse_line(line: &[u8]) -> Option<Event> {
    let line = String::from_utf8_lossy(line);
    let data = line.trim_end_matches(&['\r', '\n'][..]).strip_prefix("data:")?.trim_start();
    match data {
        "" => None,
        "[DONE]" => Some(Event::Done),
        json => Some(Event::Data(json.to_string())),
    }
}

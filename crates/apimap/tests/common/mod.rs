//! Shared test doubles: a scripted transport and a tracing capture writer.

// Not every test binary uses every helper.
#![allow(dead_code)]

use apimap::{
    ApiError, ApiResult, BoxFuture, DispatchConfig, MetadataMap, Transport, TransportResponse,
};
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

type Responder = Box<dyn Fn(&DispatchConfig) -> ApiResult<TransportResponse> + Send + Sync>;

enum Behavior {
    Respond(Responder),
    /// Never settles on its own; settles only through the call's cancel
    /// token.
    Hang,
}

/// A scripted [`Transport`] that records every dispatch it sees.
pub struct MockTransport {
    behavior: Behavior,
    calls: Mutex<Vec<DispatchConfig>>,
}

impl MockTransport {
    pub fn respond_with(
        responder: impl Fn(&DispatchConfig) -> ApiResult<TransportResponse> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            behavior: Behavior::Respond(Box::new(responder)),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Responds `200 OK` with a fixed body.
    pub fn ok(body: serde_json::Value) -> Arc<Self> {
        Self::respond_with(move |_config| Ok(TransportResponse::ok(body.clone())))
    }

    /// Fails every dispatch with a transport error.
    pub fn failing(message: &'static str) -> Arc<Self> {
        Self::respond_with(move |_config| Err(ApiError::transport(message)))
    }

    /// Hangs until the call's cancel token fires.
    pub fn hanging() -> Arc<Self> {
        Arc::new(Self {
            behavior: Behavior::Hang,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Returns the dispatch configs seen so far.
    pub fn calls(&self) -> Vec<DispatchConfig> {
        self.calls.lock().clone()
    }
}

impl Transport for MockTransport {
    fn dispatch(&self, config: DispatchConfig) -> BoxFuture<'static, ApiResult<TransportResponse>> {
        self.calls.lock().push(config.clone());
        match &self.behavior {
            Behavior::Respond(responder) => {
                let result = responder(&config);
                Box::pin(async move { result })
            }
            Behavior::Hang => Box::pin(async move {
                match config.cancel {
                    Some(token) => {
                        let reason = token.cancelled().await;
                        Err(ApiError::transport(reason))
                    }
                    None => std::future::pending().await,
                }
            }),
        }
    }
}

/// Parses a metadata mapping from inline JSON.
pub fn metadatas(value: serde_json::Value) -> MetadataMap {
    serde_json::from_value(value).expect("test metadata is valid")
}

/// A `MakeWriter` capturing formatted tracing output for assertions.
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    /// Counts output lines containing `needle`.
    pub fn lines_containing(&self, needle: &str) -> usize {
        self.contents()
            .lines()
            .filter(|line| line.contains(needle))
            .count()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

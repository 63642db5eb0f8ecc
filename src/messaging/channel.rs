use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::error::FormError;
use crate::messaging::message::{MessageHandler, Request, Response, parse_request};

/// Reliable one-shot request/response channel. The sender blocks until the
/// single reply arrives.
pub trait MessageChannel {
    fn send(&mut self, request: Request) -> Result<Response, FormError>;
}

impl<C: MessageChannel + ?Sized> MessageChannel for &mut C {
    fn send(&mut self, request: Request) -> Result<Response, FormError> {
        (**self).send(request)
    }
}

impl<C: MessageChannel + ?Sized> MessageChannel for Box<C> {
    fn send(&mut self, request: Request) -> Result<Response, FormError> {
        (**self).send(request)
    }
}

// ============================================================================
// In-process channel
// ============================================================================

/// Delivers requests straight to a handler living in the same process.
pub struct LocalChannel<H> {
    pub handler: H,
}

impl<H: MessageHandler> LocalChannel<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    pub fn into_inner(self) -> H {
        self.handler
    }
}

impl<H: MessageHandler> MessageChannel for LocalChannel<H> {
    fn send(&mut self, request: Request) -> Result<Response, FormError> {
        debug!(action = request.action(), "local dispatch");
        Ok(self.handler.handle(request))
    }
}

// ============================================================================
// NDJSON channel (one JSON object per line)
// ============================================================================

/// Client side of a line-delimited JSON exchange with another process.
pub struct NdjsonChannel<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> NdjsonChannel<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R: BufRead, W: Write> MessageChannel for NdjsonChannel<R, W> {
    fn send(&mut self, request: Request) -> Result<Response, FormError> {
        let json = serde_json::to_string(&request).map_err(|e| FormError::JsonSerialize {
            context: "Request".into(),
            source: e,
        })?;

        writeln!(self.writer, "{}", json)
            .map_err(|e| FormError::ChannelIo(format!("Failed to write request: {}", e)))?;
        self.writer
            .flush()
            .map_err(|e| FormError::ChannelIo(format!("Failed to flush request: {}", e)))?;

        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|e| FormError::ChannelIo(format!("Failed to read response: {}", e)))?;

        if line.trim().is_empty() {
            return Err(FormError::ChannelIo(
                "Empty response (peer may have exited)".into(),
            ));
        }

        serde_json::from_str(line.trim()).map_err(|e| FormError::JsonParse {
            context: "response line".into(),
            source: e,
        })
    }
}

/// Serve a handler over a line-delimited JSON stream until EOF.
///
/// Every non-blank input line gets exactly one output line. Malformed lines
/// and unknown actions are answered with a failure response.
pub fn serve_ndjson<R: BufRead, W: Write, H: MessageHandler>(
    reader: R,
    mut writer: W,
    handler: &mut H,
) -> Result<usize, FormError> {
    let mut served = 0;

    for line in reader.lines() {
        let line = line.map_err(|e| FormError::ChannelIo(format!("Failed to read request: {}", e)))?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match parse_request(line.trim()) {
            Ok(request) => handler.handle(request),
            Err(e) => {
                warn!(error = %e, "rejected request line");
                Response::from_error(&e)
            }
        };

        let json = serde_json::to_string(&response).map_err(|e| FormError::JsonSerialize {
            context: "Response".into(),
            source: e,
        })?;
        writeln!(writer, "{}", json)
            .and_then(|_| writer.flush())
            .map_err(|e| FormError::ChannelIo(format!("Failed to write response: {}", e)))?;
        served += 1;
    }

    debug!(served, "message stream closed");
    Ok(served)
}

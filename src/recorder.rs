//! Request/response capture.
//!
//! A recorder is handed to [`crate::cdm::Cdm`] explicitly; nothing in the
//! crate consults global verbosity state.

/// Direction of a recorded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Request,
    Response,
}

/// One message exchanged with a license server.
#[derive(Debug, Clone, Copy)]
pub struct Exchange<'a> {
    pub direction: Direction,
    pub url: &'a str,
    pub body: &'a [u8],
}

/// Receives every request and response of a license transaction.
pub trait ExchangeRecorder {
    fn record(&self, exchange: &Exchange<'_>);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRecorder;

impl ExchangeRecorder for NullRecorder {
    fn record(&self, _exchange: &Exchange<'_>) {}
}

/// Emits one `debug` event per exchange with the body length and a hex preview.
#[derive(Debug, Clone, Copy)]
pub struct TracingRecorder {
    /// Maximum number of body bytes included in the preview.
    pub preview: usize,
}

impl Default for TracingRecorder {
    fn default() -> Self {
        Self { preview: 64 }
    }
}

impl ExchangeRecorder for TracingRecorder {
    fn record(&self, exchange: &Exchange<'_>) {
        let shown = exchange.body.len().min(self.preview);
        let preview = hex::encode(&exchange.body[..shown]);
        let truncated = if shown < exchange.body.len() { "..." } else { "" };
        debug!(
            "{:?} {} ({} bytes): {}{}",
            exchange.direction,
            exchange.url,
            exchange.body.len(),
            preview,
            truncated
        );
    }
}

impl<R: ExchangeRecorder + ?Sized> ExchangeRecorder for &R {
    fn record(&self, exchange: &Exchange<'_>) {
        (**self).record(exchange)
    }
}

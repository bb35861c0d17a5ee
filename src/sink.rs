use async_trait::async_trait;
use std::error::Error;

/// Outbound transport for encoded webhook payloads.
///
/// Implementations post one payload to one URL. The delivery worker calls
/// `send` from its background task and never from the thread that emitted
/// the log event.
#[async_trait]
pub trait WebhookSink: Send + Sync {
    /// Deliver `payload` to `endpoint`.
    ///
    /// **Parameters**
    /// - `endpoint`: target URL, read from the shared config right before
    ///   the call.
    /// - `payload`: complete JSON body produced by the encoder.
    ///
    /// **Returns**
    /// - `Ok(body)` with the response body when the server accepted the
    ///   payload.
    /// - `Err(..)` on connection failure, non-success status or an
    ///   unreadable body. The worker reports the failure and moves on; it
    ///   never retries.
    async fn send(
        &self,
        endpoint: &str,
        payload: Vec<u8>,
    ) -> Result<String, Box<dyn Error + Send + Sync>>;
}

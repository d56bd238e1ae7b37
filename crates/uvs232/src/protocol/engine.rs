//! Request engine
//!
//! Sends one frame and waits for the response. Each exchange clears the port
//! buffers, waits the inter-request delay, writes the frame and spawns a
//! poller task that waits for the response bytes. The caller races the
//! poller against the response timeout; a failed exchange is retried once.

use std::io::{Read, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use super::commands::Command;
use super::config::SessionConfig;
use super::transport::Transport;
use super::{ProtocolError, MAX_BUFFER_SIZE};

/// Transport shared between a session and its poller task
pub(crate) type SharedTransport = Arc<Mutex<Box<dyn Transport>>>;

/// Executes requests against an open transport
pub struct RequestEngine {
    transport: SharedTransport,
    config: SessionConfig,
}

impl RequestEngine {
    /// Wrap an open transport
    pub fn new(transport: Box<dyn Transport>, config: SessionConfig) -> Self {
        Self {
            transport: Arc::new(Mutex::new(transport)),
            config,
        }
    }

    pub(crate) fn transport(&self) -> &SharedTransport {
        &self.transport
    }

    /// Session timing
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Send `frame` and return the response.
    ///
    /// On failure the exchange is repeated exactly once after the retry
    /// delay; the error of the second attempt is returned.
    pub async fn request(&self, command: Command, frame: &[u8]) -> Result<Vec<u8>, ProtocolError> {
        let operation = command.operation();
        match self.exchange(frame).await {
            Ok(response) => Ok(response),
            Err(e) => {
                warn!(
                    "the {} request has failed ({}), retrying in {}ms",
                    operation,
                    e,
                    self.config.retry_delay().as_millis()
                );
                tokio::time::sleep(self.config.retry_delay()).await;

                self.exchange(frame).await.map_err(|e| {
                    error!("the {} request has failed: {}", operation, e);
                    e
                })
            }
        }
    }

    /// One attempt: clear, delay, write, wait for the response
    async fn exchange(&self, frame: &[u8]) -> Result<Vec<u8>, ProtocolError> {
        {
            let mut transport = self.transport.lock().await;
            transport.clear_input_buffer()?;
            transport.clear_output_buffer()?;
        }

        tokio::time::sleep(self.config.send_delay()).await;

        let start = Instant::now();
        trace!("request: {:02x?}", frame);
        {
            let mut transport = self.transport.lock().await;
            transport.write_all(frame)?;
            transport.flush()?;
        }

        let cancel = CancellationToken::new();
        // stops the poller if this future is dropped mid-flight
        let _cancel_on_drop = cancel.clone().drop_guard();
        let mut poller = tokio::spawn(poll_response(
            self.transport.clone(),
            cancel.clone(),
            self.config.poll_interval(),
        ));

        let response = match tokio::time::timeout(self.config.timeout(), &mut poller).await {
            Ok(joined) => joined.map_err(|e| ProtocolError::TaskFailed(e.to_string()))??,
            Err(_) => {
                cancel.cancel();
                // the poller must release the port before the next request
                let _ = poller.await;
                debug!(
                    "no response within {}ms",
                    self.config.timeout().as_millis()
                );
                return Err(ProtocolError::Timeout);
            }
        };

        trace!(
            "response ({} bytes) in {}ms: {:02x?}",
            response.len(),
            start.elapsed().as_millis(),
            response
        );
        Ok(response)
    }
}

/// Wait for response bytes and read them.
///
/// Polls until the first bytes are available, then keeps reading while more
/// bytes arrive within one poll interval or the buffer is full.
async fn poll_response(
    transport: SharedTransport,
    cancel: CancellationToken,
    interval: Duration,
) -> Result<Vec<u8>, ProtocolError> {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Err(ProtocolError::Cancelled),
            _ = tokio::time::sleep(interval) => {}
        }
        if transport.lock().await.bytes_to_read()? > 0 {
            break;
        }
    }

    let mut buffer = [0u8; MAX_BUFFER_SIZE];
    let mut received = 0;
    loop {
        let n = transport.lock().await.read(&mut buffer[received..])?;
        if n == 0 {
            break;
        }
        received += n;
        if received == buffer.len() {
            break;
        }

        tokio::select! {
            _ = cancel.cancelled() => return Err(ProtocolError::Cancelled),
            _ = tokio::time::sleep(interval) => {}
        }
        if transport.lock().await.bytes_to_read()? == 0 {
            break;
        }
    }

    if received == 0 {
        return Err(ProtocolError::EndOfStream);
    }
    Ok(buffer[..received].to_vec())
}

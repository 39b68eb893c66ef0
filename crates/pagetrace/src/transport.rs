//! Beacon and pixel senders.

use crate::config::{Config, SendType};
use crate::types::Message;
use crate::Error;
use tracing::{debug, warn};

/// The transport a tracker dispatches through, resolved exactly once at
/// build time and never renegotiated.
///
/// `send` resolves exactly once per message — that resolution is the
/// completion signal callers observe. Neither variant retries, and failures
/// are logged rather than surfaced: a failed send is indistinguishable from
/// a slow one.
#[derive(Debug)]
pub(crate) enum Sender {
    Beacon(BeaconTransport),
    Pixel(PixelTransport),
}

impl Sender {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = reqwest::Client::builder().build()?;
        let dsn = config.dsn().to_string();
        Ok(match config.send_type() {
            SendType::Beacon => Sender::Beacon(BeaconTransport { client, dsn }),
            SendType::Image => Sender::Pixel(PixelTransport { client, dsn }),
        })
    }

    /// Dispatch one message to the collection endpoint.
    pub async fn send(&self, message: &Message) {
        match self {
            Sender::Beacon(transport) => transport.send(message).await,
            Sender::Pixel(transport) => transport.send(message).await,
        }
    }
}

/// Fire-and-forget form POST, beacon style.
///
/// The request runs on its own task; `send` resolves after a zero-delay
/// deferral, so completion means "handed off", not "delivered". A request
/// that fails after hand-off is only logged — known gap, matching the
/// platform beacon call this models.
#[derive(Debug)]
pub(crate) struct BeaconTransport {
    client: reqwest::Client,
    dsn: String,
}

impl BeaconTransport {
    async fn send(&self, message: &Message) {
        let pairs = message.to_query_pairs();
        let request = self.client.post(&self.dsn).form(&pairs);
        tokio::spawn(async move {
            match request.send().await {
                Ok(response) => debug!(status = %response.status(), "beacon delivered"),
                Err(err) => debug!(error = %err, "beacon send failed"),
            }
        });
        tokio::task::yield_now().await;
    }
}

/// GET with the message flattened into the query string, pixel style.
///
/// Resolves once the request settles — response or error, the way an image
/// element fires exactly one of load/error/abort.
#[derive(Debug)]
pub(crate) struct PixelTransport {
    client: reqwest::Client,
    dsn: String,
}

impl PixelTransport {
    async fn send(&self, message: &Message) {
        let pairs = message.to_query_pairs();
        match self.client.get(&self.dsn).query(&pairs).send().await {
            Ok(response) => debug!(status = %response.status(), "pixel delivered"),
            Err(err) => warn!(error = %err, "pixel send failed"),
        }
    }
}

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("transport already closed")]
    Closed,

    #[error("connection dropped: {0}")]
    Dropped(String),
}

/// Something that happened on the inbound side of the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Frame(String),
    /// The peer went away. Carries the close reason or read error, if any.
    Disconnected(Option<String>),
}

/// Outbound half of a session's connection.
///
/// Sends are fire-and-forget: a frame is queued and the call returns
/// before it hits the wire. Frames queued before `close` are still delivered.
pub trait Transport: Send {
    fn send(&mut self, frame: String) -> Result<(), TransportError>;

    /// Close the connection. Calling it again does nothing.
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

/// WebSocket transport backed by two tokio tasks, one writing and one reading.
pub struct WsTransport {
    outbound: Option<mpsc::UnboundedSender<String>>,
}

pub type Inbound = mpsc::UnboundedReceiver<TransportEvent>;

impl WsTransport {
    /// Open a connection to `url`.
    ///
    /// Returns the outbound half together with the stream of inbound events.
    /// The event stream always ends with a `Disconnected` event.
    pub async fn connect(url: &str) -> Result<(WsTransport, Inbound), TransportError> {
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|e| TransportError::Connect {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        log::info!("connected to {url}");

        let (mut sink, mut source) = stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(frame) = outbound_rx.recv().await {
                if let Err(e) = sink.send(Message::Text(frame)).await {
                    log::warn!("error writing frame, error: {:#}", e);
                    return;
                }
            }
            // sender dropped: everything queued has been written
            if let Err(e) = sink.close().await {
                log::debug!("error closing websocket, error: {:#}", e);
            }
        });

        tokio::spawn(async move {
            let reason = loop {
                match source.next().await {
                    Some(Ok(Message::Text(text))) => {
                        if event_tx.send(TransportEvent::Frame(text)).is_err() {
                            return;
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        break frame.map(|f| f.reason.to_string());
                    }
                    Some(Ok(other)) => {
                        log::debug!("ignoring non-text frame: {:?}", other);
                    }
                    Some(Err(e)) => break Some(e.to_string()),
                    None => break None,
                }
            };
            let _ = event_tx.send(TransportEvent::Disconnected(reason));
        });

        Ok((
            WsTransport {
                outbound: Some(outbound_tx),
            },
            event_rx,
        ))
    }
}

impl Transport for WsTransport {
    fn send(&mut self, frame: String) -> Result<(), TransportError> {
        let outbound = self.outbound.as_ref().ok_or(TransportError::Closed)?;
        outbound
            .send(frame)
            .map_err(|_| TransportError::Dropped("writer stopped".to_string()))
    }

    fn close(&mut self) {
        // dropping the sender lets the writer drain its queue and close the socket
        if self.outbound.take().is_some() {
            log::info!("closing websocket");
        }
    }

    fn is_closed(&self) -> bool {
        self.outbound.is_none()
    }
}

use nanoid::nanoid;
use serde::Serialize;

use crate::codec::{self, Inbound, Outbound};
use crate::config::{Config, ConfigError};
use crate::data_models::SearchResult;
use crate::pager::{PAGE_SIZE, ResultQueue};
use crate::persistence::{HttpPersistence, PersistenceError, PersistenceGateway};
use crate::transport::{self, Transport, TransportError, TransportEvent, WsTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    /// Connected, nothing asked yet.
    Idle,
    /// Waiting on results for a query or a `more` request.
    Querying,
    /// A page is on screen.
    Presenting,
    /// Feedback sent and the connection closed. Terminal.
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to store {failed} of {total} accepted results: {source}")]
    Persistence {
        failed: usize,
        total: usize,
        #[source]
        source: PersistenceError,
    },
}

/// What a call to [`Session::more`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoreOutcome {
    /// Next page came from the local queue.
    Paged,
    /// Queue was empty; asked the backend for more.
    Requested,
    /// Session is closed.
    Ignored,
}

/// Read-only snapshot of a session, for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub id: String,
    pub state: SessionState,
    pub loading: bool,
    pub current_page: Vec<SearchResult>,
    pub queued: usize,
    pub suggestions: Vec<String>,
    pub error: Option<String>,
}

/// Client side of one query-to-feedback exchange with the search backend.
///
/// All state lives here and only changes through the methods below, which
/// are called from a single task: user actions and inbound transport events
/// are serialized by the caller.
pub struct Session<T, P> {
    id: String,
    state: SessionState,
    loading: bool,
    current_page: Vec<SearchResult>,
    queue: ResultQueue,
    suggestions: Vec<String>,
    last_query: Option<String>,
    transport_error: Option<TransportError>,
    transport: T,
    gateway: P,
}

impl Session<WsTransport, HttpPersistence> {
    /// Open the backend connection described by `config`.
    ///
    /// Returns the session and the inbound event stream the caller must
    /// feed back through [`Session::handle_event`].
    pub async fn connect(config: &Config) -> Result<(Self, transport::Inbound), SessionError> {
        config.validate()?;
        let (transport, inbound) = WsTransport::connect(&config.ws_url).await?;
        let gateway = HttpPersistence::new(&config.api_url);
        Ok((Session::new(transport, gateway), inbound))
    }
}

impl<T, P> Session<T, P>
where
    T: Transport,
    P: PersistenceGateway,
{
    pub fn new(transport: T, gateway: P) -> Self {
        let session = Self {
            id: nanoid!(10),
            state: SessionState::Idle,
            loading: false,
            current_page: Vec::new(),
            queue: ResultQueue::new(),
            suggestions: Vec::new(),
            last_query: None,
            transport_error: None,
            transport,
            gateway,
        };
        log::info!("[{}] session started", session.id);
        session
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn current_page(&self) -> &[SearchResult] {
        &self.current_page
    }

    pub fn queue(&self) -> &ResultQueue {
        &self.queue
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// Last transport failure seen, kept so the UI can show it.
    pub fn transport_error(&self) -> Option<&TransportError> {
        self.transport_error.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn gateway(&self) -> &P {
        &self.gateway
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id.clone(),
            state: self.state,
            loading: self.loading,
            current_page: self.current_page.clone(),
            queued: self.queue.len(),
            suggestions: self.suggestions.clone(),
            error: self.transport_error.as_ref().map(|e| e.to_string()),
        }
    }

    // =========================================================================
    // User actions
    // =========================================================================

    /// Start a new search, discarding whatever the previous one left behind.
    ///
    /// Returns false (and does nothing) for blank text or a closed session.
    pub fn submit_query(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || self.state == SessionState::Closed {
            return false;
        }

        self.queue.clear();
        self.current_page.clear();
        self.suggestions.clear();
        self.loading = true;
        self.state = SessionState::Querying;
        self.last_query = Some(text.to_string());

        log::info!("[{}] submitting query {:?}", self.id, text);
        self.send(Outbound::Query(text.to_string()));
        true
    }

    /// Ask for autocomplete suggestions. Leaves results and loading alone.
    pub fn request_suggestions(&mut self, text: &str) -> bool {
        if text.trim().is_empty() || self.state == SessionState::Closed {
            return false;
        }
        self.send(Outbound::Suggest(text.to_string()));
        true
    }

    /// User wants something else: show the next queued page, or ask the
    /// backend for more once the queue is drained.
    pub fn more(&mut self) -> MoreOutcome {
        if self.state == SessionState::Closed {
            return MoreOutcome::Ignored;
        }

        if !self.queue.is_empty() {
            self.current_page = self.queue.next_page(PAGE_SIZE);
            self.state = SessionState::Presenting;
            self.loading = false;
            return MoreOutcome::Paged;
        }

        // cleared so the next results batch is presented instead of buffered
        self.current_page.clear();
        self.loading = true;
        self.state = SessionState::Querying;
        log::info!("[{}] queue drained, requesting more", self.id);
        self.send(Outbound::More);
        MoreOutcome::Requested
    }

    /// User accepted the page on screen.
    ///
    /// Stores each displayed result in display order, then sends the accept
    /// signal and closes the connection. Storage failures don't stop the
    /// exchange from finishing; the first one is returned once the session is
    /// closed. Returns the number of results stored. A closed session stores
    /// nothing and returns `Ok(0)`.
    pub async fn accept(&mut self) -> Result<usize, SessionError> {
        if self.state == SessionState::Closed {
            return Ok(0);
        }

        let query = self.last_query.clone().unwrap_or_default();
        let total = self.current_page.len();
        let mut failed = 0;
        let mut first_error = None;

        for result in &self.current_page {
            match self.gateway.store_result(&query, result).await {
                Ok(ack) => {
                    log::info!("[{}] stored {}, ack: {}", self.id, result.link, ack);
                }
                Err(e) => {
                    log::error!("[{}] error storing {}, error: {:#}", self.id, result.link, e);
                    failed += 1;
                    first_error.get_or_insert(e);
                }
            }
        }

        self.send(Outbound::Feedback);
        self.transport.close();
        self.state = SessionState::Closed;
        self.loading = false;
        log::info!("[{}] session closed", self.id);

        match first_error {
            Some(source) => Err(SessionError::Persistence {
                failed,
                total,
                source,
            }),
            None => Ok(total),
        }
    }

    // =========================================================================
    // Inbound
    // =========================================================================

    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Frame(frame) => self.handle_frame(&frame),
            TransportEvent::Disconnected(reason) => self.on_disconnect(reason),
        }
    }

    /// Decode and apply one inbound frame. Bad frames are logged and dropped.
    pub fn handle_frame(&mut self, frame: &str) {
        if self.state == SessionState::Closed {
            log::debug!("[{}] closed, dropping frame", self.id);
            return;
        }

        match codec::decode(frame) {
            Ok(Inbound::Results(batch)) => self.on_results(batch),
            Ok(Inbound::Suggestions(list)) => self.on_suggestions(list),
            Ok(Inbound::Info(text)) => self.on_info(&text),
            Err(e) => {
                log::warn!("[{}] ignoring inbound frame, error: {:#}", self.id, e);
            }
        }
    }

    /// Queue a results batch; present a page right away if none is showing.
    pub fn on_results(&mut self, batch: Vec<SearchResult>) {
        if self.state == SessionState::Closed {
            return;
        }
        log::debug!("[{}] received {} results", self.id, batch.len());
        self.queue.append(batch);

        if self.current_page.is_empty() {
            self.current_page = self.queue.next_page(PAGE_SIZE);
            if !self.current_page.is_empty() {
                self.loading = false;
                self.state = SessionState::Presenting;
            }
        }
    }

    pub fn on_suggestions(&mut self, list: Vec<String>) {
        if self.state == SessionState::Closed {
            return;
        }
        self.suggestions = list;
    }

    pub fn on_info(&self, text: &str) {
        log::info!("[{}] backend: {}", self.id, text);
    }

    /// The connection went away. Nothing more will arrive; the session keeps
    /// its state and the error is kept for the UI.
    pub fn on_disconnect(&mut self, reason: Option<String>) {
        if self.state == SessionState::Closed {
            log::debug!("[{}] connection finished", self.id);
            return;
        }
        let reason = reason.unwrap_or_else(|| "connection closed by peer".to_string());
        log::error!("[{}] transport lost: {}", self.id, reason);
        self.transport_error = Some(TransportError::Dropped(reason));
    }

    fn send(&mut self, message: Outbound) {
        let kind = message.kind();
        match self.transport.send(message.encode()) {
            Ok(()) => log::debug!("[{}] sent {}", self.id, kind),
            Err(e) => {
                log::error!("[{}] error sending {}, error: {:#}", self.id, kind, e);
                self.transport_error = Some(e);
            }
        }
    }
}

//! Report session: binds filter edits to the live preview and to document
//! generation.
//!
//! ```text
//! Idle → PreviewLoading → PreviewReady ⇄ PreviewLoading
//!                          PreviewReady → GenerateLoading → Closed
//! ```
//!
//! Fetches run as spawned tasks and report back over a channel; the owner
//! drives the session by awaiting [`ReportSession::next_event`]. Results are
//! applied in fingerprint order, a superseded response is dropped on arrival.

use contracts::shared::report::{
    FilterState, Record, ReportDefinition, ReportMode, ReportPayload, ReportRequest, ReportResult,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::data_source::ReportDataSource;
use crate::error::{FetchError, SessionError};
use crate::export::{suggested_filename, DocumentEmitter, EmittedDocument};
use crate::filter_session::FilterSession;
use crate::layout::{DocumentLayoutEngine, PageGeometry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    PreviewLoading,
    PreviewReady,
    GenerateLoading,
    Closed,
}

/// Something the host UI should react to
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PreviewUpdated { shown: usize, total: usize },
    PreviewFailed(FetchError),
    /// The document was written and the session is now closed
    Generated(EmittedDocument),
    GenerateFailed(FetchError),
    /// Writing failed; the preview is kept so generate can be retried
    EmissionFailed(String),
}

type FetchOutcome = ReportResult<FetchError>;

pub struct ReportSession {
    id: Uuid,
    definition: ReportDefinition,
    filters: FilterSession,
    source: Arc<dyn ReportDataSource>,
    emitter: Arc<dyn DocumentEmitter>,
    layout: DocumentLayoutEngine,
    geometry: PageGeometry,
    state: SessionState,
    preview: ReportPayload,
    last_error: Option<String>,
    results_tx: mpsc::UnboundedSender<FetchOutcome>,
    results_rx: mpsc::UnboundedReceiver<FetchOutcome>,
    in_flight: usize,
}

impl ReportSession {
    pub fn new(
        definition: ReportDefinition,
        config: &EngineConfig,
        source: Arc<dyn ReportDataSource>,
        emitter: Arc<dyn DocumentEmitter>,
    ) -> Self {
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let geometry = config.page.oriented(definition.orientation);
        let filters = FilterSession::new(config.session.debounce(), definition.date_range_enabled);
        Self {
            id: Uuid::new_v4(),
            filters,
            source,
            emitter,
            layout: DocumentLayoutEngine::from_config(config),
            geometry,
            state: SessionState::Idle,
            preview: ReportPayload::default(),
            last_error: None,
            results_tx,
            results_rx,
            in_flight: 0,
            definition,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn definition(&self) -> &ReportDefinition {
        &self.definition
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Refresh and generate affordances must be disabled while this is true
    pub fn pending(&self) -> bool {
        self.filters.is_pending()
    }

    pub fn filter_state(&self) -> &FilterState {
        self.filters.state()
    }

    pub fn preview_records(&self) -> &[Record] {
        &self.preview.data
    }

    pub fn preview_total(&self) -> usize {
        self.preview.total
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// "Showing all N records" or "Showing M of N records" when the source truncated
    pub fn summary(&self) -> String {
        let shown = self.preview.data.len();
        let total = self.preview.total;
        let noun = if total == 1 { "record" } else { "records" };
        if shown == total {
            format!("Showing all {} {}", total, noun)
        } else {
            format!("Showing {} of {} {}", shown, total, noun)
        }
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.state == SessionState::Closed {
            return Err(SessionError::Closed);
        }
        Ok(())
    }

    /// Start the session with an immediate preview fetch.
    /// Must be called from within a tokio runtime, like every fetching intent.
    pub fn open(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        tracing::info!("Report session {} opened for {}", self.id, self.definition.id);
        let request = self.filters.request_preview();
        self.dispatch(request);
        Ok(())
    }

    /// Merge a filter value; the preview refreshes after the debounce window
    pub fn edit_filter(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.ensure_open()?;
        let filter = self
            .definition
            .filter(key)
            .ok_or_else(|| SessionError::UnknownFilter(key.to_string()))?;
        if !filter.accepts(value) {
            return Err(SessionError::InvalidOption {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
        self.filters.set_filter(key, value, Instant::now());
        Ok(())
    }

    /// Empty or missing bounds mean unbounded
    pub fn edit_date_range(&mut self, from: Option<&str>, to: Option<&str>) -> Result<(), SessionError> {
        self.ensure_open()?;
        for bound in [from, to].into_iter().flatten() {
            if !bound.is_empty()
                && chrono::NaiveDate::parse_from_str(bound, "%Y-%m-%d").is_err()
            {
                return Err(SessionError::InvalidDate(bound.to_string()));
            }
        }
        self.filters.set_date_range(
            from.map(str::to_string),
            to.map(str::to_string),
            Instant::now(),
        )
    }

    /// Manual, non-debounced preview refresh
    pub fn refresh(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        if self.pending() {
            return Err(SessionError::Busy);
        }
        let request = self.filters.request_preview();
        self.dispatch(request);
        Ok(())
    }

    /// Fetch the complete result set and emit the document.
    ///
    /// Rejected synchronously, with no fetch issued, when the preview is empty
    /// or a filter edit has not been previewed yet.
    pub fn generate(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        let request = self.filters.request_generate(self.preview.data.len())?;
        self.dispatch(request);
        Ok(())
    }

    /// Terminal: discards the filter state and any result still in flight
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.filters.discard();
        self.preview = ReportPayload::default();
        self.state = SessionState::Closed;
        tracing::info!("Report session {} closed", self.id);
    }

    fn dispatch(&mut self, request: ReportRequest) {
        self.state = match request.mode {
            ReportMode::Preview => SessionState::PreviewLoading,
            ReportMode::Generate => SessionState::GenerateLoading,
        };
        self.in_flight += 1;

        let source = Arc::clone(&self.source);
        let results = self.results_tx.clone();
        let filters = request.filters.clone();
        let mode = request.mode;
        tokio::spawn(async move {
            // a panicking source still has to answer, or the session stays pending
            let fetch = tokio::spawn(async move { source.fetch(&filters, mode).await });
            let outcome = match fetch.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Fetch task {} aborted: {}", request.fingerprint, e);
                    Err(FetchError::Rejected(format!("fetch task failed: {}", e)))
                }
            };
            // receiver is gone once the session is dropped
            let _ = results.send(ReportResult::answering(&request, outcome));
        });
    }

    /// Wait for the next debounce expiry or fetch completion.
    ///
    /// Returns `None` once there is nothing left to wait for or the session
    /// is closed.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        loop {
            if self.state == SessionState::Closed {
                return None;
            }
            let due = self.filters.due_at();
            if due.is_none() && self.in_flight == 0 {
                return None;
            }
            let wake_at = due.unwrap_or_else(Instant::now);

            tokio::select! {
                Some(result) = self.results_rx.recv(), if self.in_flight > 0 => {
                    self.in_flight -= 1;
                    if let Some(event) = self.apply(result).await {
                        return Some(event);
                    }
                }
                _ = tokio::time::sleep_until(wake_at), if due.is_some() => {
                    if let Some(request) = self.filters.poll_due(Instant::now()) {
                        self.dispatch(request);
                    }
                }
                else => return None,
            }
        }
    }

    /// Drain events until the session goes quiet
    pub async fn run_until_idle(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        events
    }

    async fn apply(&mut self, result: FetchOutcome) -> Option<SessionEvent> {
        if !self.filters.accept(result.fingerprint) {
            return None;
        }
        match (result.mode, result.outcome) {
            (ReportMode::Preview, Ok(payload)) => {
                tracing::info!(
                    "Preview {} applied: {} of {} records",
                    result.fingerprint,
                    payload.data.len(),
                    payload.total
                );
                let event = SessionEvent::PreviewUpdated {
                    shown: payload.data.len(),
                    total: payload.total,
                };
                self.preview = payload;
                self.last_error = None;
                self.state = SessionState::PreviewReady;
                Some(event)
            }
            (ReportMode::Generate, Ok(payload)) => Some(self.emit_document(payload).await),
            (mode, Err(e)) => {
                tracing::warn!("{:?} fetch {} failed: {}", mode, result.fingerprint, e);
                self.preview = ReportPayload::default();
                self.last_error = Some(e.to_string());
                self.state = SessionState::Idle;
                Some(match mode {
                    ReportMode::Preview => SessionEvent::PreviewFailed(e),
                    ReportMode::Generate => SessionEvent::GenerateFailed(e),
                })
            }
        }
    }

    async fn emit_document(&mut self, payload: ReportPayload) -> SessionEvent {
        let generated_at = chrono::Local::now().naive_local();
        let document = self.layout.layout(
            &self.definition.title,
            &payload.data,
            &self.definition.columns,
            &self.geometry,
            generated_at,
        );
        let filename = suggested_filename(
            &self.definition.title,
            generated_at.date(),
            self.emitter.format(),
        );

        match self.emitter.emit(&document, &filename).await {
            Ok(emitted) => {
                tracing::info!(
                    "Generated {} ({} pages, {} rows)",
                    emitted.path.display(),
                    emitted.pages,
                    emitted.rows
                );
                self.close();
                SessionEvent::Generated(emitted)
            }
            Err(e) => {
                tracing::warn!("Document emission failed: {}", e);
                self.last_error = Some(e.to_string());
                self.state = if self.preview.is_empty() {
                    SessionState::Idle
                } else {
                    SessionState::PreviewReady
                };
                SessionEvent::EmissionFailed(e.to_string())
            }
        }
    }
}

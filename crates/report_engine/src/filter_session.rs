//! Filter state, trailing-edge debounce and fingerprinted fetch requests.
//!
//! `FilterSession` does no I/O and never reads the clock itself: every
//! time-dependent call takes `now`, so debounce behaviour is driven by
//! whoever owns the session (the async [`crate::session::ReportSession`] or a
//! test moving a virtual clock).

use contracts::shared::report::{
    Fingerprint, FilterState, ReportMode, ReportRequest,
};
use std::time::Duration;
use tokio::time::Instant;

use crate::error::SessionError;

#[derive(Debug, Clone)]
pub struct FilterSession {
    state: FilterState,
    date_range_enabled: bool,
    debounce: Duration,
    /// Deadline of the scheduled preview fetch, reset by every edit
    due_at: Option<Instant>,
    last_fingerprint: Fingerprint,
    /// Mode of the outstanding latest request; `None` when nothing is pending
    pending: Option<ReportMode>,
}

impl FilterSession {
    pub fn new(debounce: Duration, date_range_enabled: bool) -> Self {
        Self {
            state: FilterState::default(),
            date_range_enabled,
            debounce,
            due_at: None,
            last_fingerprint: Fingerprint::default(),
            pending: None,
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_mode(&self) -> Option<ReportMode> {
        self.pending
    }

    pub fn last_fingerprint(&self) -> Fingerprint {
        self.last_fingerprint
    }

    /// Merge a value and (re)start the debounce window. Accepted while pending.
    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<String>, now: Instant) {
        self.state.set(key, value);
        self.schedule(now);
    }

    pub fn set_date_range(
        &mut self,
        from: Option<String>,
        to: Option<String>,
        now: Instant,
    ) -> Result<(), SessionError> {
        if !self.date_range_enabled {
            return Err(SessionError::DateRangeDisabled);
        }
        self.state.set_date_range(from, to);
        self.schedule(now);
        Ok(())
    }

    fn schedule(&mut self, now: Instant) {
        self.due_at = Some(now + self.debounce);
        tracing::debug!("Preview fetch scheduled in {:?}", self.debounce);
    }

    /// When the debounced fetch should fire.
    ///
    /// Held back while a Generate request is outstanding so a late edit can
    /// not supersede the document being produced.
    pub fn due_at(&self) -> Option<Instant> {
        match self.pending {
            Some(ReportMode::Generate) => None,
            _ => self.due_at,
        }
    }

    /// Issue the debounced preview request once the window has elapsed
    pub fn poll_due(&mut self, now: Instant) -> Option<ReportRequest> {
        let due = self.due_at()?;
        if now < due {
            return None;
        }
        Some(self.request_preview())
    }

    /// Immediate preview fetch (manual refresh, session start). Cancels the debounce.
    pub fn request_preview(&mut self) -> ReportRequest {
        self.due_at = None;
        self.issue(ReportMode::Preview)
    }

    /// Immediate generate fetch. Rejected before any request is issued when
    /// the latest preview is empty, another request is outstanding, or an
    /// edit is still waiting out the debounce (the export would not match
    /// the preview on screen).
    pub fn request_generate(&mut self, preview_len: usize) -> Result<ReportRequest, SessionError> {
        if preview_len == 0 {
            return Err(SessionError::EmptyPreview);
        }
        if self.is_pending() {
            return Err(SessionError::Busy);
        }
        if self.due_at.is_some() {
            return Err(SessionError::PreviewOutdated);
        }
        Ok(self.issue(ReportMode::Generate))
    }

    fn issue(&mut self, mode: ReportMode) -> ReportRequest {
        self.last_fingerprint = self.last_fingerprint.next();
        self.pending = Some(mode);
        tracing::debug!("Issuing {:?} request {}", mode, self.last_fingerprint);
        ReportRequest {
            filters: self.state.clone(),
            mode,
            fingerprint: self.last_fingerprint,
        }
    }

    /// Whether a result carrying `fingerprint` may be applied.
    ///
    /// Only the most recently issued request is current; accepting it
    /// clears `pending`. Anything older is stale and leaves state untouched.
    pub fn accept(&mut self, fingerprint: Fingerprint) -> bool {
        if fingerprint != self.last_fingerprint {
            tracing::debug!(
                "Discarding stale result {} (current {})",
                fingerprint,
                self.last_fingerprint
            );
            return false;
        }
        self.pending = None;
        true
    }

    /// Drop the filter state and any scheduled fetch
    pub fn discard(&mut self) {
        self.state.clear();
        self.due_at = None;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBOUNCE: Duration = Duration::from_millis(300);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_burst_of_edits_issues_one_fetch_with_final_state() {
        let start = Instant::now();
        let mut session = FilterSession::new(DEBOUNCE, true);

        session.set_filter("purok", "G", start);
        session.set_filter("purok", "Go", start + ms(100));
        session.set_filter("bloodType", "O+", start + ms(250));

        // 300ms after the first edit, but only 50ms after the last one
        assert!(session.poll_due(start + ms(300)).is_none());
        assert!(session.poll_due(start + ms(549)).is_none());

        let request = session.poll_due(start + ms(550)).unwrap();
        assert_eq!(request.mode, ReportMode::Preview);
        assert_eq!(request.filters.get("purok"), Some("Go"));
        assert_eq!(request.filters.get("bloodType"), Some("O+"));

        // nothing else settles afterwards
        assert!(session.poll_due(start + ms(5000)).is_none());
        assert_eq!(session.last_fingerprint(), Fingerprint(1));
    }

    #[test]
    fn test_newest_fingerprint_wins_regardless_of_arrival() {
        let mut session = FilterSession::new(DEBOUNCE, false);
        let first = session.request_preview();
        let second = session.request_preview();
        assert!(second.fingerprint > first.fingerprint);

        assert!(session.accept(second.fingerprint));
        assert!(!session.is_pending());
        assert!(!session.accept(first.fingerprint));
    }

    #[test]
    fn test_stale_result_keeps_pending() {
        let mut session = FilterSession::new(DEBOUNCE, false);
        let first = session.request_preview();
        let _second = session.request_preview();

        assert!(!session.accept(first.fingerprint));
        assert!(session.is_pending());
    }

    #[test]
    fn test_edits_accepted_while_pending() {
        let start = Instant::now();
        let mut session = FilterSession::new(DEBOUNCE, false);
        let _initial = session.request_preview();
        assert!(session.is_pending());

        session.set_filter("name", "Cruz", start);
        let request = session.poll_due(start + DEBOUNCE).unwrap();
        assert_eq!(request.fingerprint, Fingerprint(2));
    }

    #[test]
    fn test_manual_refresh_cancels_debounce() {
        let start = Instant::now();
        let mut session = FilterSession::new(DEBOUNCE, false);
        session.set_filter("purok", "Go", start);
        let request = session.request_preview();
        assert_eq!(request.filters.get("purok"), Some("Go"));
        assert!(session.due_at().is_none());
        assert!(session.poll_due(start + ms(1000)).is_none());
    }

    #[test]
    fn test_generate_requires_non_empty_preview() {
        let mut session = FilterSession::new(DEBOUNCE, false);
        assert_eq!(session.request_generate(0), Err(SessionError::EmptyPreview));
        // no fingerprint was consumed
        assert_eq!(session.last_fingerprint(), Fingerprint(0));
        assert!(!session.is_pending());
    }

    #[test]
    fn test_generate_rejected_while_pending() {
        let mut session = FilterSession::new(DEBOUNCE, false);
        let preview = session.request_preview();
        assert_eq!(session.request_generate(3), Err(SessionError::Busy));

        assert!(session.accept(preview.fingerprint));
        let generate = session.request_generate(3).unwrap();
        assert_eq!(generate.mode, ReportMode::Generate);
        assert_eq!(session.pending_mode(), Some(ReportMode::Generate));
    }

    #[test]
    fn test_generate_rejected_while_edit_unsettled() {
        let start = Instant::now();
        let mut session = FilterSession::new(DEBOUNCE, false);
        let preview = session.request_preview();
        assert!(session.accept(preview.fingerprint));

        session.set_filter("purok", "Go", start);
        assert_eq!(session.request_generate(3), Err(SessionError::PreviewOutdated));
        assert_eq!(session.last_fingerprint(), Fingerprint(1));

        let settled = session.poll_due(start + DEBOUNCE).unwrap();
        assert!(session.accept(settled.fingerprint));
        let generate = session.request_generate(3).unwrap();
        assert_eq!(generate.filters.get("purok"), Some("Go"));
    }

    #[test]
    fn test_debounce_held_while_generating() {
        let start = Instant::now();
        let mut session = FilterSession::new(DEBOUNCE, false);
        let generate = session.request_generate(1).unwrap();

        session.set_filter("purok", "Go", start);
        assert!(session.due_at().is_none());
        assert!(session.poll_due(start + ms(1000)).is_none());

        assert!(session.accept(generate.fingerprint));
        assert!(session.poll_due(start + ms(1000)).is_some());
    }

    #[test]
    fn test_date_range_disabled() {
        let mut session = FilterSession::new(DEBOUNCE, false);
        let result = session.set_date_range(Some("2024-01-01".into()), None, Instant::now());
        assert_eq!(result, Err(SessionError::DateRangeDisabled));
        assert!(session.due_at().is_none());
    }

    #[test]
    fn test_date_range_debounced_like_filters() {
        let start = Instant::now();
        let mut session = FilterSession::new(DEBOUNCE, true);
        session
            .set_date_range(Some("2024-01-01".into()), Some(String::new()), start)
            .unwrap();
        let request = session.poll_due(start + DEBOUNCE).unwrap();
        assert_eq!(request.filters.date_from.as_deref(), Some("2024-01-01"));
        assert_eq!(request.filters.date_to, None);
    }
}

use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Failure,
}

/// A user-facing outcome message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    #[serde(skip)]
    pub raised_at: Instant,
}

/// Holds the latest notice and clears it once `ttl` has passed.
#[derive(Debug)]
pub struct NoticeBoard {
    current: Option<Notice>,
    ttl: Duration,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        NoticeBoard { current: None, ttl }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.raise(NoticeKind::Success, message.into());
    }

    pub fn failure(&mut self, message: impl Into<String>) {
        self.raise(NoticeKind::Failure, message.into());
    }

    fn raise(&mut self, kind: NoticeKind, message: String) {
        self.current = Some(Notice { kind, message, raised_at: Instant::now() });
    }

    /// The live notice at `now`, dropping it if it has expired.
    pub fn visible(&mut self, now: Instant) -> Option<&Notice> {
        let expired = self
            .current
            .as_ref()
            .is_some_and(|n| now.saturating_duration_since(n.raised_at) >= self.ttl);
        if expired {
            self.current = None;
        }
        self.current.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}

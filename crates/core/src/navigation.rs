use chrono::{DateTime, Duration, Utc};

/// Keys whose default navigation behavior is suppressed while the slide
/// popup is open. `"Space"` and `" "` both appear because platforms are
/// inconsistent about how the space bar is reported.
pub const BLOCKED_KEYS: &[&str] = &[
    "ArrowLeft",
    "ArrowRight",
    "ArrowUp",
    "ArrowDown",
    "PageUp",
    "PageDown",
    "Home",
    "End",
    "Space",
    "Enter",
    "Backspace",
    " ",
];

/// Decision for a keydown observed while the popup is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDecision {
    /// Cancel default behavior and propagation.
    Block,
    /// Not a navigation key; let it through.
    Pass,
}

#[must_use]
pub fn key_decision(key: &str) -> KeyDecision {
    if BLOCKED_KEYS.contains(&key) {
        KeyDecision::Block
    } else {
        KeyDecision::Pass
    }
}

/// What triggered a "navigation blocked" notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// A blocklisted key while the popup was open.
    Key,
    /// A page-change signal from the embedded viewer itself.
    ViewerPageChange,
    /// Wheel or trackpad scroll over the viewer.
    Scroll,
}

impl BlockReason {
    /// How long the advisory notice stays visible.
    #[must_use]
    pub fn notice_duration(self) -> Duration {
        match self {
            Self::Key | Self::ViewerPageChange => Duration::seconds(2),
            Self::Scroll => Duration::milliseconds(1500),
        }
    }
}

/// A transient advisory shown when navigation input is rejected.
///
/// Raising a new notice while one is visible restarts the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockedNotice {
    reason: BlockReason,
    expires_at: DateTime<Utc>,
}

impl BlockedNotice {
    #[must_use]
    pub fn raise(reason: BlockReason, now: DateTime<Utc>) -> Self {
        Self {
            reason,
            expires_at: now + reason.notice_duration(),
        }
    }

    #[must_use]
    pub fn reason(&self) -> BlockReason {
        self.reason
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn navigation_keys_are_blocked() {
        for key in ["ArrowRight", "PageDown", "Home", "End", "Enter", "Backspace", " ", "Space"] {
            assert_eq!(key_decision(key), KeyDecision::Block, "{key}");
        }
    }

    #[test]
    fn ordinary_keys_pass() {
        assert_eq!(key_decision("a"), KeyDecision::Pass);
        assert_eq!(key_decision("Escape"), KeyDecision::Pass);
        assert_eq!(key_decision("Tab"), KeyDecision::Pass);
    }

    #[test]
    fn notice_durations_differ_for_scroll() {
        assert_eq!(BlockReason::Key.notice_duration(), Duration::seconds(2));
        assert_eq!(
            BlockReason::ViewerPageChange.notice_duration(),
            Duration::seconds(2)
        );
        assert_eq!(
            BlockReason::Scroll.notice_duration(),
            Duration::milliseconds(1500)
        );
    }

    #[test]
    fn notice_expires_at_its_deadline() {
        let now = fixed_now();
        let notice = BlockedNotice::raise(BlockReason::ViewerPageChange, now);
        assert!(!notice.is_expired(now + Duration::milliseconds(1999)));
        assert!(notice.is_expired(now + Duration::seconds(2)));
    }
}

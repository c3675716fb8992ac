/// A cancelable one-shot deadline polled by the host loop.
///
/// Time is whatever millisecond clock the caller passes in; the deadline
/// never reads a clock itself.
#[derive(Debug, Clone)]
pub struct Deadline {
    name: &'static str,
    due_ms: Option<u64>,
}

impl Deadline {
    pub const fn new(name: &'static str) -> Self {
        Self { name, due_ms: None }
    }

    /// Fire `delay_ms` after `now_ms`, replacing any earlier arming.
    pub const fn arm(&mut self, now_ms: u64, delay_ms: u64) {
        self.due_ms = Some(now_ms.saturating_add(delay_ms));
    }

    pub const fn cancel(&mut self) {
        self.due_ms = None;
    }

    /// True once per arming, on the first poll at or after the due time.
    pub fn take_ready(&mut self, now_ms: u64) -> bool {
        match self.due_ms {
            Some(due) if now_ms >= due => {
                self.due_ms = None;
                true
            }
            _ => false,
        }
    }

    pub const fn is_pending(&self) -> bool {
        self.due_ms.is_some()
    }

    pub const fn due_ms(&self) -> Option<u64> {
        self.due_ms
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

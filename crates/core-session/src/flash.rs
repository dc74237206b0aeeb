use std::time::{Duration, Instant};

/// Times the transient flash message the reducer leaves in state.
///
/// The clock starts when a message is first observed; a different message
/// restarts it.
#[derive(Debug, Default)]
pub struct FlashTimer {
    shown: Option<(String, Instant)>,
}

impl FlashTimer {
    pub fn observe(&mut self, flash: Option<&str>, now: Instant) {
        match (flash, &self.shown) {
            (None, _) => self.shown = None,
            (Some(msg), Some((seen, _))) if seen == msg => {}
            (Some(msg), _) => self.shown = Some((msg.to_string(), now)),
        }
    }

    pub fn expired(&self, now: Instant, ttl: Duration) -> bool {
        self.shown
            .as_ref()
            .is_some_and(|(_, since)| now.saturating_duration_since(*since) >= ttl)
    }
}

use crate::selection::{InteractionEvent, Transition};

/// Counters for one dashboard session, reported when the session closes.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct SessionMetrics {
    pub events_processed: u64,
    pub hovers: u64,
    pub timer_ticks: u64,
    pub ignored_hovers: u64,
    pub saturated_ticks: u64,
    pub frames_emitted: u64,
}

impl SessionMetrics {
    pub fn record(&mut self, event: &InteractionEvent, transition: &Transition) {
        self.events_processed += 1;
        match event {
            InteractionEvent::Hover(_) => self.hovers += 1,
            InteractionEvent::TimerTick => self.timer_ticks += 1,
        }
        match transition {
            Transition::Ignored { .. } => self.ignored_hovers += 1,
            Transition::Saturated => self.saturated_ticks += 1,
            _ => {}
        }
    }

    pub fn record_frame(&mut self) {
        self.frames_emitted += 1;
    }
}

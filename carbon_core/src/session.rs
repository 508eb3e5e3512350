use std::sync::Arc;

use carbon_proto::{ClientMessage, DashboardFrame};
use tracing::{debug, info, warn};

use crate::{
    dataset::LookupError,
    metrics::SessionMetrics,
    selection::{InteractionEvent, SelectionState, Transition},
    DashboardContext,
};

/// One connected page: owns its selection state and turns events into frames.
///
/// Not shared between tasks; the connection task that owns it is the only
/// writer, so events are applied strictly in arrival order.
pub struct DashboardSession {
    id: u64,
    context: Arc<DashboardContext>,
    state: SelectionState,
    sequence: u64,
    metrics: SessionMetrics,
}

impl DashboardSession {
    pub(crate) fn new(id: u64, context: Arc<DashboardContext>) -> Self {
        info!(target: "carbon_dashboard::session", session = id, "session.opened");
        Self {
            id,
            context,
            state: SelectionState::new(),
            sequence: 0,
            metrics: SessionMetrics::default(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    /// First frame of the session; the only one carrying the map figure.
    pub fn initial_frame(&mut self) -> Result<DashboardFrame, LookupError> {
        self.frame(true)
    }

    /// Apply one event; yields a frame when the selection moved.
    pub fn handle(
        &mut self,
        event: InteractionEvent,
    ) -> Result<Option<DashboardFrame>, LookupError> {
        if self.apply(&event) {
            self.frame(false).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Apply every event of a message in order; at most one frame results.
    pub fn handle_message(
        &mut self,
        message: ClientMessage,
    ) -> Result<Option<DashboardFrame>, LookupError> {
        let mut changed = false;
        for event in message.into_events() {
            changed |= self.apply(&event.into());
        }
        if changed {
            self.frame(false).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn close(self) -> SessionMetrics {
        let metrics = self.metrics;
        info!(
            target: "carbon_dashboard::session",
            session = self.id,
            events = metrics.events_processed,
            hovers = metrics.hovers,
            ticks = metrics.timer_ticks,
            ignored = metrics.ignored_hovers,
            saturated = metrics.saturated_ticks,
            frames = metrics.frames_emitted,
            "session.closed"
        );
        metrics
    }

    fn apply(&mut self, event: &InteractionEvent) -> bool {
        let transition = self.context.router().apply(&mut self.state, event);
        self.metrics.record(event, &transition);

        match &transition {
            Transition::Selected { country } => debug!(
                target: "carbon_dashboard::session",
                session = self.id,
                %country,
                "selection.changed"
            ),
            Transition::Cleared => debug!(
                target: "carbon_dashboard::session",
                session = self.id,
                "selection.cleared"
            ),
            Transition::Ignored { country } => warn!(
                target: "carbon_dashboard::session",
                session = self.id,
                %country,
                "selection.ignored=unknown_country"
            ),
            Transition::Advanced { .. } | Transition::Saturated | Transition::Unchanged => {}
        }

        transition.changed()
    }

    fn frame(&mut self, include_map: bool) -> Result<DashboardFrame, LookupError> {
        let projector = self.context.projector();
        let donuts = projector.project_donuts(&self.state)?;
        let frame = DashboardFrame {
            sequence: self.sequence,
            selection: projector.summary(&donuts.selection),
            map: include_map.then(|| projector.map_figure()),
            low_carbon: donuts.low_carbon,
            renewable: donuts.renewable,
        };
        self.sequence += 1;
        self.metrics.record_frame();
        Ok(frame)
    }
}

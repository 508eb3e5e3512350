//! Per-session selection state and the reducer that moves it.
//!
//! Events are applied strictly one at a time. When the page reports several
//! triggers together they are applied in the order received, so the last
//! trigger decides the resulting state.

use std::sync::Arc;

use carbon_proto::ClientEvent;

use crate::dataset::Dataset;

/// Country the user is inspecting and how far its donut fill has advanced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    active_country: Option<String>,
    progress_ticks: u32,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` means the default country is rendered.
    pub fn active_country(&self) -> Option<&str> {
        self.active_country.as_deref()
    }

    pub fn progress_ticks(&self) -> u32 {
        self.progress_ticks
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionEvent {
    /// Country under the pointer; `None` once the pointer leaves the map.
    Hover(Option<String>),
    TimerTick,
}

impl From<ClientEvent> for InteractionEvent {
    fn from(event: ClientEvent) -> Self {
        match event {
            ClientEvent::Hover { country } => InteractionEvent::Hover(country),
            ClientEvent::Tick => InteractionEvent::TimerTick,
        }
    }
}

/// Outcome of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Selected { country: String },
    Cleared,
    Advanced { progress_ticks: u32 },
    /// Tick arrived with progress already at the cap.
    Saturated,
    /// Hovered location is not in the dataset; state retained.
    Ignored { country: String },
    Unchanged,
}

impl Transition {
    pub fn changed(&self) -> bool {
        matches!(
            self,
            Transition::Selected { .. } | Transition::Cleared | Transition::Advanced { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub struct InteractionRouter {
    dataset: Arc<Dataset>,
    max_ticks: u32,
}

impl InteractionRouter {
    pub fn new(dataset: Arc<Dataset>, max_ticks: u32) -> Self {
        Self { dataset, max_ticks }
    }

    pub fn max_ticks(&self) -> u32 {
        self.max_ticks
    }

    pub fn reduce(
        &self,
        state: SelectionState,
        event: &InteractionEvent,
    ) -> (SelectionState, Transition) {
        match event {
            InteractionEvent::Hover(Some(country)) => {
                if state.active_country.as_deref() == Some(country.as_str()) {
                    return (state, Transition::Unchanged);
                }
                if !self.dataset.contains(country) {
                    return (
                        state,
                        Transition::Ignored {
                            country: country.clone(),
                        },
                    );
                }
                (
                    SelectionState {
                        active_country: Some(country.clone()),
                        progress_ticks: 0,
                    },
                    Transition::Selected {
                        country: country.clone(),
                    },
                )
            }
            InteractionEvent::Hover(None) => {
                if state.active_country.is_none() && state.progress_ticks == 0 {
                    (state, Transition::Unchanged)
                } else {
                    (SelectionState::default(), Transition::Cleared)
                }
            }
            InteractionEvent::TimerTick => {
                if state.active_country.is_none() {
                    return (state, Transition::Unchanged);
                }
                if state.progress_ticks >= self.max_ticks {
                    return (state, Transition::Saturated);
                }
                let progress_ticks = state.progress_ticks + 1;
                (
                    SelectionState {
                        progress_ticks,
                        ..state
                    },
                    Transition::Advanced { progress_ticks },
                )
            }
        }
    }

    pub fn apply(&self, state: &mut SelectionState, event: &InteractionEvent) -> Transition {
        let (next, transition) = self.reduce(std::mem::take(state), event);
        *state = next;
        transition
    }

    pub fn apply_all<'a>(
        &self,
        state: &mut SelectionState,
        events: impl IntoIterator<Item = &'a InteractionEvent>,
    ) -> Vec<Transition> {
        events
            .into_iter()
            .map(|event| self.apply(state, event))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> InteractionRouter {
        let dataset = Dataset::from_csv_str(
            "country,carbon-intensity,low-carbon,renewable\n\
             Belgium,120,45.0,30.0\n\
             France,56,91.2,27.5\n",
        )
        .unwrap();
        InteractionRouter::new(Arc::new(dataset), 20)
    }

    fn hover(country: &str) -> InteractionEvent {
        InteractionEvent::Hover(Some(country.to_string()))
    }

    #[test]
    fn hovering_new_country_resets_progress() {
        let router = router();
        let mut state = SelectionState::new();
        router.apply(&mut state, &hover("Belgium"));
        for _ in 0..5 {
            router.apply(&mut state, &InteractionEvent::TimerTick);
        }
        assert_eq!(state.progress_ticks(), 5);

        let transition = router.apply(&mut state, &hover("France"));
        assert_eq!(
            transition,
            Transition::Selected {
                country: "France".to_string()
            }
        );
        assert_eq!(state.active_country(), Some("France"));
        assert_eq!(state.progress_ticks(), 0);
    }

    #[test]
    fn rehovering_same_country_keeps_progress() {
        let router = router();
        let mut state = SelectionState::new();
        router.apply(&mut state, &hover("Belgium"));
        router.apply(&mut state, &InteractionEvent::TimerTick);
        router.apply(&mut state, &InteractionEvent::TimerTick);

        let transition = router.apply(&mut state, &hover("Belgium"));
        assert_eq!(transition, Transition::Unchanged);
        assert!(!transition.changed());
        assert_eq!(state.progress_ticks(), 2);
    }

    #[test]
    fn ticks_saturate_at_max() {
        let router = router();
        let mut state = SelectionState::new();
        router.apply(&mut state, &hover("Belgium"));
        let ticks = vec![InteractionEvent::TimerTick; 50];
        let transitions = router.apply_all(&mut state, &ticks);
        assert_eq!(state.progress_ticks(), 20);
        assert_eq!(
            transitions[19],
            Transition::Advanced { progress_ticks: 20 }
        );
        assert!(transitions[20..]
            .iter()
            .all(|transition| *transition == Transition::Saturated));
    }

    #[test]
    fn tick_without_selection_is_a_no_op() {
        let router = router();
        let mut state = SelectionState::new();
        let transition = router.apply(&mut state, &InteractionEvent::TimerTick);
        assert_eq!(transition, Transition::Unchanged);
        assert_eq!(state, SelectionState::new());
    }

    #[test]
    fn leaving_map_clears_selection() {
        let router = router();
        let mut state = SelectionState::new();
        router.apply(&mut state, &hover("France"));
        router.apply(&mut state, &InteractionEvent::TimerTick);

        assert_eq!(
            router.apply(&mut state, &InteractionEvent::Hover(None)),
            Transition::Cleared
        );
        assert_eq!(state.active_country(), None);
        assert_eq!(state.progress_ticks(), 0);
        assert_eq!(
            router.apply(&mut state, &InteractionEvent::Hover(None)),
            Transition::Unchanged
        );
    }

    #[test]
    fn unknown_country_is_ignored() {
        let router = router();
        let mut state = SelectionState::new();
        router.apply(&mut state, &hover("Belgium"));
        router.apply(&mut state, &InteractionEvent::TimerTick);

        let transition = router.apply(&mut state, &hover("Atlantis"));
        assert_eq!(
            transition,
            Transition::Ignored {
                country: "Atlantis".to_string()
            }
        );
        assert_eq!(state.active_country(), Some("Belgium"));
        assert_eq!(state.progress_ticks(), 1);
    }

    #[test]
    fn reduce_leaves_input_untouched() {
        let router = router();
        let before = SelectionState::new();
        let (after, _) = router.reduce(before.clone(), &hover("France"));
        assert_eq!(before, SelectionState::new());
        assert_eq!(after.active_country(), Some("France"));
    }

    #[test]
    fn batch_applies_in_order_last_trigger_wins() {
        let router = router();
        let mut state = SelectionState::new();
        let events = [
            hover("Belgium"),
            InteractionEvent::TimerTick,
            hover("France"),
        ];
        router.apply_all(&mut state, &events);
        assert_eq!(state.active_country(), Some("France"));
        assert_eq!(state.progress_ticks(), 0);
    }

    #[test]
    fn client_events_map_onto_interactions() {
        assert_eq!(
            InteractionEvent::from(ClientEvent::hover("Belgium")),
            hover("Belgium")
        );
        assert_eq!(
            InteractionEvent::from(ClientEvent::leave()),
            InteractionEvent::Hover(None)
        );
        assert_eq!(
            InteractionEvent::from(ClientEvent::Tick),
            InteractionEvent::TimerTick
        );
    }
}

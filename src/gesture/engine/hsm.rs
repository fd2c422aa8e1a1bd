use log::trace;
use statig::prelude::*;

use super::{DispatchContext, GestureEvent, GestureSession, SessionAction, StartSample};
use crate::{
    config::GestureTolerances,
    geometry::{squared, squared_distance, Point, ScrollOffset},
    gesture::trace::Invalidation,
};

pub(super) struct GestureHsm {
    move_tolerance_sq: f64,
    scroll_boundary_px: f64,
    pub(super) session: GestureSession,
}

impl GestureHsm {
    pub(super) fn new(tolerances: &GestureTolerances, scroll_boundary_px: f64) -> Self {
        Self {
            move_tolerance_sq: squared(f64::from(tolerances.move_tolerance_px)),
            scroll_boundary_px,
            session: GestureSession::default(),
        }
    }

    fn begin(&mut self, context: &mut DispatchContext, start: &StartSample, restarted: bool) {
        self.session = GestureSession {
            active: true,
            origin: start.origin,
            scroll_origin: start.scroll,
            target_hint: start.target_hint,
        };
        trace!(
            "tracking from ({}, {}) scroll ({}, {})",
            start.origin.x,
            start.origin.y,
            start.scroll.x,
            start.scroll.y
        );
        context.emit(SessionAction::Began { restarted });
    }

    fn invalidation(&self, at: Point, scroll: ScrollOffset) -> Invalidation {
        let delta = scroll - self.session.scroll_origin;
        Invalidation {
            moved: squared_distance(at, self.session.origin) > self.move_tolerance_sq,
            scrolled: delta.x.abs() > self.scroll_boundary_px
                || delta.y.abs() > self.scroll_boundary_px,
        }
    }
}

#[state_machine(initial = "State::idle()")]
impl GestureHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &GestureEvent) -> Outcome<State> {
        match event {
            GestureEvent::Start(start) => {
                self.begin(context, start, false);
                Transition(State::tracking())
            }
            GestureEvent::Move { .. } | GestureEvent::End | GestureEvent::Cancel => {
                context.emit(SessionAction::Ignored);
                Handled
            }
        }
    }

    #[state]
    fn tracking(&mut self, context: &mut DispatchContext, event: &GestureEvent) -> Outcome<State> {
        match event {
            GestureEvent::Start(start) => {
                self.begin(context, start, true);
                Handled
            }
            GestureEvent::Move { at, scroll } => {
                let invalidation = self.invalidation(*at, *scroll);
                if !invalidation.any() {
                    return Handled;
                }
                self.session.active = false;
                context.emit(SessionAction::Invalidated(invalidation));
                Transition(State::idle())
            }
            GestureEvent::End => {
                // Cleared before any tree work so a re-entrant end is ignored.
                self.session.active = false;
                context.emit(SessionAction::Released(self.session));
                Transition(State::idle())
            }
            GestureEvent::Cancel => {
                self.session.active = false;
                context.emit(SessionAction::Cancelled);
                Transition(State::idle())
            }
        }
    }
}

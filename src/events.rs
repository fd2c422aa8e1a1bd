use crate::{geometry::Point, tree::NodeId};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TouchPoint {
    pub page: Point,
    pub client: Point,
    pub screen: Point,
}

impl TouchPoint {
    pub fn new(page: Point, client: Point) -> Self {
        Self {
            page,
            client,
            screen: client,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One touch lifecycle event. `touches` carries the target touches for
/// start/move and the changed touches for end; only the first is tracked.
#[derive(Clone, Debug, PartialEq)]
pub struct TouchInput {
    pub phase: TouchPhase,
    pub t_ms: u64,
    pub touches: Vec<TouchPoint>,
}

impl TouchInput {
    pub fn new(phase: TouchPhase, t_ms: u64, touches: Vec<TouchPoint>) -> Self {
        Self {
            phase,
            t_ms,
            touches,
        }
    }

    pub fn single(phase: TouchPhase, t_ms: u64, touch: TouchPoint) -> Self {
        Self::new(phase, t_ms, vec![touch])
    }

    pub fn primary(&self) -> Option<&TouchPoint> {
        self.touches.first()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

/// Activation synthesized by the engine on a recognised tap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SyntheticActivation {
    pub target: NodeId,
    pub client: Point,
    pub screen: Point,
    pub detail: u32,
    pub bubbles: bool,
    pub cancelable: bool,
    pub modifiers: Modifiers,
    pub button: u16,
}

impl SyntheticActivation {
    pub fn at(target: NodeId, client: Point, screen: Point) -> Self {
        Self {
            target,
            client,
            screen,
            detail: 1,
            bubbles: true,
            cancelable: true,
            modifiers: Modifiers::default(),
            button: 0,
        }
    }
}

/// Activation seen by the region's activation listener.
///
/// `Forwarded` is the engine's own signal coming back through dispatch; every
/// other activation (the platform's delayed one, or programmatic ones from
/// other code) arrives as `Native`, stamped with the host's clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActivationSignal {
    Forwarded(SyntheticActivation),
    Native { t_ms: u64, cancelable: bool },
}

impl ActivationSignal {
    pub fn is_forwarded(&self) -> bool {
        matches!(self, ActivationSignal::Forwarded(_))
    }
}

/// What the host must do with the event it just delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    Continue,
    Handled,
    Suppress { immediate: bool },
}

impl Disposition {
    pub fn prevents_default(self) -> bool {
        matches!(self, Disposition::Suppress { .. })
    }

    pub fn stops_propagation(self) -> bool {
        matches!(self, Disposition::Suppress { .. })
    }

    pub fn stops_immediate_propagation(self) -> bool {
        matches!(self, Disposition::Suppress { immediate: true })
    }

    pub fn lets_through(self) -> bool {
        !self.prevents_default()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RegionEvent {
    Touch(TouchInput),
    Activation(ActivationSignal),
}

impl From<TouchInput> for RegionEvent {
    fn from(input: TouchInput) -> Self {
        RegionEvent::Touch(input)
    }
}

impl From<ActivationSignal> for RegionEvent {
    fn from(signal: ActivationSignal) -> Self {
        RegionEvent::Activation(signal)
    }
}

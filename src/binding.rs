use log::info;
use thiserror::Error;

use crate::{
    events::{Disposition, RegionEvent, TouchPhase},
    gesture::GestureEngine,
    options::Options,
    platform::Capabilities,
    tree::{EventKind, EventTarget, Listener, ListenerId, NodeId, Phase, VisualTree},
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("region {0:?} is not a node of the visual tree")]
    InvalidTarget(NodeId),
    #[error("marker class `{0}` must be a single non-empty class name")]
    InvalidMarkerClass(String),
}

/// A region bound to the tap engine.
///
/// On platforms without touch support the binding is inert: nothing is
/// registered and every event is left alone.
pub struct FastTap {
    region: NodeId,
    engine: GestureEngine,
    installed: heapless::Vec<ListenerId, 5>,
    bound: bool,
}

impl FastTap {
    pub fn create<T>(
        tree: &mut T,
        region: NodeId,
        options: &Options,
        caps: Capabilities,
    ) -> Result<Self, BindError>
    where
        T: VisualTree + EventTarget + ?Sized,
    {
        if !tree.contains(region) {
            return Err(BindError::InvalidTarget(region));
        }
        let feedback = options.feedback()?;
        let engine = GestureEngine::new(caps, feedback);

        if !caps.touch {
            info!("no touch support; region {region:?} left native");
            return Ok(Self {
                region,
                engine,
                installed: heapless::Vec::new(),
                bound: false,
            });
        }

        let mut installed = heapless::Vec::new();
        for kind in EventKind::LIFECYCLE {
            let id = tree.add_listener(region, kind, Phase::Capture, Listener::Engine);
            let _ = installed.push(id);
        }

        // The legacy slot handler keeps running, now as a regular listener.
        if let Some(handler) = tree.take_legacy_activation_handler(region) {
            tree.add_listener(
                region,
                EventKind::Activation,
                Phase::Bubble,
                Listener::Adopted(handler),
            );
        }

        info!("bound tap handling to region {region:?}");
        Ok(Self {
            region,
            engine,
            installed,
            bound: true,
        })
    }

    pub fn handle<T: VisualTree + ?Sized>(
        &mut self,
        tree: &mut T,
        event: &RegionEvent,
    ) -> Disposition {
        if !self.bound {
            return Disposition::Continue;
        }
        match event {
            RegionEvent::Touch(input) => match input.phase {
                TouchPhase::Start => self.engine.touch_start(tree, input),
                TouchPhase::Move => self.engine.touch_move(tree, input),
                TouchPhase::End => self.engine.touch_end(tree, input),
                TouchPhase::Cancel => self.engine.touch_cancel(tree, input),
            },
            RegionEvent::Activation(signal) => self.engine.activation(tree, signal),
        }
    }

    pub fn tick<T: VisualTree + ?Sized>(&mut self, tree: &mut T, now_ms: u64) -> bool {
        self.bound && self.engine.tick(tree, now_ms)
    }

    pub fn next_deadline_ms(&self) -> Option<u64> {
        if self.bound {
            self.engine.next_deadline_ms()
        } else {
            None
        }
    }

    /// Removes exactly the listeners this binding registered. Calling it
    /// again does nothing.
    pub fn destroy<T: EventTarget + ?Sized>(&mut self, tree: &mut T) {
        if !self.bound {
            return;
        }
        for id in self.installed.iter().copied() {
            tree.remove_listener(self.region, id);
        }
        self.installed.clear();
        self.bound = false;
        info!("unbound tap handling from region {:?}", self.region);
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn engine(&self) -> &GestureEngine {
        &self.engine
    }

    pub fn region(&self) -> NodeId {
        self.region
    }
}

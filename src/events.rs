//! Host event fan-out.
//!
//! The host raises one [`GameEvent`] per world action and the dispatcher offers it to
//! each registered handler in registration order. A handler that answers
//! [`EventOutcome::Cancel`] vetoes the action and later handlers never see it.

use log::{debug, trace};

use crate::world::{Actor, BlockPos, HostWorld, ItemStack};

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    BlockBreak {
        actor: Actor,
        pos: BlockPos,
    },
    BlockPlace {
        actor: Actor,
        pos: BlockPos,
        /// The item the block was placed from, when the host knows it.
        stack: Option<ItemStack>,
    },
    BlockUse {
        actor: Actor,
        pos: BlockPos,
    },
    ActorDeath {
        actor: Actor,
    },
    ActorJoin {
        actor: Actor,
    },
    ActorLeave {
        actor: Actor,
    },
    Tick {
        dt_ms: u64,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EventKind {
    BlockBreak,
    BlockPlace,
    BlockUse,
    ActorDeath,
    ActorJoin,
    ActorLeave,
    Tick,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::BlockBreak { .. } => EventKind::BlockBreak,
            GameEvent::BlockPlace { .. } => EventKind::BlockPlace,
            GameEvent::BlockUse { .. } => EventKind::BlockUse,
            GameEvent::ActorDeath { .. } => EventKind::ActorDeath,
            GameEvent::ActorJoin { .. } => EventKind::ActorJoin,
            GameEvent::ActorLeave { .. } => EventKind::ActorLeave,
            GameEvent::Tick { .. } => EventKind::Tick,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventOutcome {
    Continue,
    /// Veto the host action.
    Cancel,
}

impl EventOutcome {
    pub fn is_cancel(self) -> bool {
        self == EventOutcome::Cancel
    }
}

type Handler = Box<dyn FnMut(&mut dyn HostWorld, &GameEvent) -> EventOutcome>;

struct Registration {
    name: &'static str,
    kind: EventKind,
    handler: Handler,
}

/// Ordered handler list, driven from the simulation thread.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Registration>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, name: &'static str, kind: EventKind, handler: F)
    where
        F: FnMut(&mut dyn HostWorld, &GameEvent) -> EventOutcome + 'static,
    {
        debug!("registered handler {} for {:?}", name, kind);
        self.handlers.push(Registration {
            name,
            kind,
            handler: Box::new(handler),
        });
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Offer `event` to matching handlers until one cancels it.
    pub fn dispatch(&mut self, world: &mut dyn HostWorld, event: &GameEvent) -> EventOutcome {
        let kind = event.kind();
        for registration in self.handlers.iter_mut().filter(|r| r.kind == kind) {
            if (registration.handler)(world, event).is_cancel() {
                trace!("{:?} cancelled by {}", kind, registration.name);
                return EventOutcome::Cancel;
            }
        }
        EventOutcome::Continue
    }
}

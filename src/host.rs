//! Wiring between the host's event stream and the two mods.
//!
//! [`ModHost`] builds the systems from a [`Config`], registers their handlers with an
//! [`EventDispatcher`] (land first, so an access denial stops graves from seeing the
//! event) and owns persistence. Everything here lives on the simulation thread.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{error, info};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::events::{EventDispatcher, EventKind, EventOutcome, GameEvent};
use crate::grave::GraveSystem;
use crate::land::{parse_land_command, CommandContext, CommandReply, LandBaron};
use crate::storage::{SaveGameStore, StorageError};
use crate::tasks::{self, MainThreadQueue};
use crate::world::{Actor, BlockPos, HostWorld};

/// Outcome of the most recent background saves, updated by [`ModHost::pump`].
#[derive(Debug, Clone, Default)]
pub struct SaveStatus {
    pub in_flight: usize,
    pub completed: u64,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl SaveStatus {
    fn finish(&mut self, result: Result<(), String>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(()) => {
                self.completed += 1;
                self.last_saved_at = Some(Utc::now());
                self.last_error = None;
            }
            Err(e) => {
                error!("background save failed: {}", e);
                self.last_error = Some(e);
            }
        }
    }
}

pub struct ModHost {
    land: Rc<RefCell<LandBaron>>,
    graves: Rc<RefCell<GraveSystem>>,
    dispatcher: EventDispatcher,
    saves: MainThreadQueue<SaveStatus>,
    status: SaveStatus,
}

impl ModHost {
    pub fn new(config: &Config) -> Self {
        let land = Rc::new(RefCell::new(LandBaron::new(config)));
        let graves = Rc::new(RefCell::new(GraveSystem::new(&config.graves)));
        let mut dispatcher = EventDispatcher::new();
        register_land(&mut dispatcher, &land);
        if config.graves.enabled {
            register_graves(&mut dispatcher, &graves);
        }
        info!("mod host ready with {} handlers", dispatcher.len());
        Self {
            land,
            graves,
            dispatcher,
            saves: MainThreadQueue::new(),
            status: SaveStatus::default(),
        }
    }

    pub fn land(&self) -> Ref<'_, LandBaron> {
        self.land.borrow()
    }

    pub fn land_mut(&self) -> RefMut<'_, LandBaron> {
        self.land.borrow_mut()
    }

    pub fn graves(&self) -> Ref<'_, GraveSystem> {
        self.graves.borrow()
    }

    pub fn dispatch(&mut self, world: &mut dyn HostWorld, event: &GameEvent) -> EventOutcome {
        self.dispatcher.dispatch(world, event)
    }

    /// Run a chat command. `None` when the verb is not ours.
    pub fn run_command(
        &mut self,
        world: &mut dyn HostWorld,
        actor: &Actor,
        selected: Option<BlockPos>,
        input: &str,
    ) -> Option<CommandReply> {
        let command = parse_land_command(input)?;
        let ctx = CommandContext {
            actor,
            selected,
        };
        Some(self.land.borrow_mut().execute(world, &ctx, command))
    }

    pub fn load(&mut self, store: &dyn SaveGameStore) {
        self.land.borrow_mut().load(store);
        self.graves.borrow_mut().load(store);
    }

    fn encode_all(&self) -> Result<Vec<(&'static str, Vec<u8>)>, StorageError> {
        let mut tables = self.land.borrow().encode_tables()?;
        tables.extend(self.graves.borrow().encode_tables()?);
        Ok(tables)
    }

    pub fn save(&self, store: &dyn SaveGameStore) -> Result<(), StorageError> {
        for (name, bytes) in self.encode_all()? {
            store.store_data(name, &bytes)?;
        }
        Ok(())
    }

    /// Encode on this thread, write on the blocking pool. The result lands in
    /// [`ModHost::save_status`] on the next [`ModHost::pump`].
    ///
    /// Must be called from within a Tokio runtime.
    pub fn save_in_background(
        &mut self,
        store: Arc<dyn SaveGameStore>,
    ) -> Result<JoinHandle<()>, StorageError> {
        let tables = self.encode_all()?;
        self.status.in_flight += 1;
        let write = move || -> Result<(), StorageError> {
            for (name, bytes) in &tables {
                store.store_data(name, bytes)?;
            }
            Ok(())
        };
        Ok(tasks::offload(
            self.saves.handle(),
            write,
            |status: &mut SaveStatus, joined| {
                let result = match joined {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(e) => Err(StorageError::Task(e.to_string()).to_string()),
                };
                status.finish(result);
            },
        ))
    }

    /// Apply finished background work. Returns how many results were applied.
    pub fn pump(&mut self) -> usize {
        self.saves.drain(&mut self.status)
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.status
    }
}

fn register_land(dispatcher: &mut EventDispatcher, land: &Rc<RefCell<LandBaron>>) {
    let system = Rc::clone(land);
    dispatcher.on("land.use", EventKind::BlockUse, move |world, event| {
        match event {
            GameEvent::BlockUse { actor, pos } => {
                system.borrow_mut().on_block_use(world, actor, *pos)
            }
            _ => EventOutcome::Continue,
        }
    });

    let system = Rc::clone(land);
    dispatcher.on("land.break", EventKind::BlockBreak, move |world, event| {
        match event {
            GameEvent::BlockBreak { actor, pos } => {
                system.borrow_mut().on_block_break(world, actor, *pos)
            }
            _ => EventOutcome::Continue,
        }
    });

    let system = Rc::clone(land);
    dispatcher.on("land.place", EventKind::BlockPlace, move |world, event| {
        match event {
            GameEvent::BlockPlace { actor, pos, stack } => {
                system
                    .borrow_mut()
                    .on_block_place(world, actor, *pos, stack.as_ref())
            }
            _ => EventOutcome::Continue,
        }
    });

    let system = Rc::clone(land);
    dispatcher.on("land.join", EventKind::ActorJoin, move |world, event| {
        match event {
            GameEvent::ActorJoin { actor } => system.borrow_mut().on_actor_join(world, actor),
            _ => EventOutcome::Continue,
        }
    });

    let system = Rc::clone(land);
    dispatcher.on("land.leave", EventKind::ActorLeave, move |_, event| {
        match event {
            GameEvent::ActorLeave { actor } => system.borrow_mut().on_actor_leave(actor),
            _ => EventOutcome::Continue,
        }
    });

    let system = Rc::clone(land);
    dispatcher.on("land.tick", EventKind::Tick, move |world, event| {
        if let GameEvent::Tick { dt_ms } = event {
            system.borrow_mut().on_tick(world, *dt_ms);
        }
        EventOutcome::Continue
    });
}

fn register_graves(dispatcher: &mut EventDispatcher, graves: &Rc<RefCell<GraveSystem>>) {
    let system = Rc::clone(graves);
    dispatcher.on("graves.death", EventKind::ActorDeath, move |world, event| {
        if let GameEvent::ActorDeath { actor } = event {
            system.borrow_mut().on_actor_death(world, actor);
        }
        EventOutcome::Continue
    });

    let system = Rc::clone(graves);
    dispatcher.on("graves.use", EventKind::BlockUse, move |world, event| {
        match event {
            GameEvent::BlockUse { actor, pos } => {
                system.borrow_mut().on_block_use(world, actor, *pos)
            }
            _ => EventOutcome::Continue,
        }
    });

    let system = Rc::clone(graves);
    dispatcher.on("graves.break", EventKind::BlockBreak, move |_, event| {
        match event {
            GameEvent::BlockBreak { pos, .. } => system.borrow_mut().on_block_break(*pos),
            _ => EventOutcome::Continue,
        }
    });

    let system = Rc::clone(graves);
    dispatcher.on("graves.cleanup", EventKind::Tick, move |world, event| {
        if let GameEvent::Tick { dt_ms } = event {
            system.borrow_mut().on_tick(world, *dt_ms);
        }
        EventOutcome::Continue
    });
}

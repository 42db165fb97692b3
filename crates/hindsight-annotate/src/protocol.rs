//! Per-task mutation state machine
//!
//! Edits apply optimistically to an in-memory copy, travel to the store as
//! a single round trip, and reconcile with the echoed task. At most one
//! mutation per task may be outstanding; a second one is rejected locally
//! with `Conflict` before anything is sent.

use chrono::Utc;
use hindsight_client::TaskStore;
use hindsight_model::{Error, Event, EventSource, Flag, Project, Result, Task};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Sync state of a task with respect to a local edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    /// No local change outstanding
    Clean,
    /// An optimistic edit is in flight to the store
    Pending,
    /// The store rejected or never received the last edit; the optimistic
    /// copy stays visible but is explicitly not persisted
    Unpersisted,
}

/// What a mutation call did
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The store confirmed the edit; the echoed task is now authoritative
    Committed(Task),
    /// Nothing to change (event already present/absent, flag already set)
    NoOp,
}

struct Slot {
    task: Task,
    state: MutationState,
}

type CommitListener = Box<dyn Fn(&str) + Send + Sync>;

/// Accepts user edits on tracked tasks and keeps their optimistic copies.
///
/// Commit listeners fire after a mutation completes and the confirmed task
/// is visible, so a cache layer registered here invalidates before any
/// later aggregation request reads it.
pub struct Annotator {
    store: Arc<dyn TaskStore>,
    slots: Mutex<HashMap<String, Slot>>,
    listeners: Mutex<Vec<CommitListener>>,
    provisional_ids: AtomicU64,
}

impl Annotator {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            store,
            slots: Mutex::new(HashMap::new()),
            listeners: Mutex::new(Vec::new()),
            provisional_ids: AtomicU64::new(0),
        }
    }

    /// Start tracking a task fetched from the store. Re-tracking a task
    /// with a mutation outstanding is ignored to avoid clobbering the
    /// optimistic copy.
    pub fn track(&self, task: Task) {
        let mut slots = self.lock_slots();
        match slots.get(&task.id) {
            Some(slot) if slot.state == MutationState::Pending => {}
            _ => {
                slots.insert(
                    task.id.clone(),
                    Slot {
                        task,
                        state: MutationState::Clean,
                    },
                );
            }
        }
    }

    /// Current local copy of a tracked task
    pub fn task(&self, task_id: &str) -> Option<Task> {
        self.lock_slots().get(task_id).map(|s| s.task.clone())
    }

    pub fn state(&self, task_id: &str) -> Option<MutationState> {
        self.lock_slots().get(task_id).map(|s| s.state)
    }

    /// Register a listener fired with the project id after each commit
    pub fn on_commit(&self, listener: impl Fn(&str) + Send + Sync + 'static) {
        self.lock_listeners().push(Box::new(listener));
    }

    /// Tag a task with an event from the project vocabulary.
    ///
    /// Fails with `Validation` for names outside the vocabulary; adding an
    /// already-present name is a no-op. The optimistic event carries a
    /// provisional id and `source = owner` until the store echoes the
    /// confirmed task.
    pub async fn add_event(
        &self,
        project: &Project,
        task_id: &str,
        event_name: &str,
    ) -> Result<MutationOutcome> {
        let events = {
            let mut slots = self.lock_slots();
            let slot = claim(&mut slots, task_id)?;

            if !project.has_event(event_name) {
                return Err(Error::validation(format!(
                    "unknown event name: {event_name}"
                )));
            }
            if slot.task.has_event(event_name) {
                return Ok(MutationOutcome::NoOp);
            }

            let event = Event {
                id: format!("local-{}", self.provisional_ids.fetch_add(1, Ordering::SeqCst) + 1),
                task_id: slot.task.id.clone(),
                session_id: slot.task.session_id.clone(),
                project_id: slot.task.project_id.clone(),
                event_name: event_name.to_string(),
                source: EventSource::Human,
                created_at: Utc::now().timestamp(),
            };
            slot.task.events.push(event);
            slot.state = MutationState::Pending;
            slot.task.events.clone()
        };

        self.submit_events(task_id, events).await
    }

    /// Remove an event by name; no-op when absent
    pub async fn remove_event(&self, task_id: &str, event_name: &str) -> Result<MutationOutcome> {
        let events = {
            let mut slots = self.lock_slots();
            let slot = claim(&mut slots, task_id)?;

            if !slot.task.has_event(event_name) {
                return Ok(MutationOutcome::NoOp);
            }
            slot.task.events.retain(|e| e.event_name != event_name);
            slot.state = MutationState::Pending;
            slot.task.events.clone()
        };

        self.submit_events(task_id, events).await
    }

    /// Relabel an automatically detected event as human-confirmed.
    /// The event stays; only its source changes.
    pub async fn confirm_event(&self, task_id: &str, event_name: &str) -> Result<MutationOutcome> {
        let events = {
            let mut slots = self.lock_slots();
            let slot = claim(&mut slots, task_id)?;

            let Some(event) = slot
                .task
                .events
                .iter_mut()
                .find(|e| e.event_name == event_name)
            else {
                return Err(Error::NotFound(format!(
                    "event {event_name} on task {task_id}"
                )));
            };
            if event.source == EventSource::Human {
                return Ok(MutationOutcome::NoOp);
            }
            event.source = EventSource::Human;
            slot.state = MutationState::Pending;
            slot.task.events.clone()
        };

        self.submit_events(task_id, events).await
    }

    /// Set the tri-state verdict; every transition is legal locally
    pub async fn set_flag(&self, task_id: &str, flag: Flag) -> Result<MutationOutcome> {
        {
            let mut slots = self.lock_slots();
            let slot = claim(&mut slots, task_id)?;

            if slot.task.flag == flag {
                return Ok(MutationOutcome::NoOp);
            }
            slot.task.flag = flag;
            slot.state = MutationState::Pending;
        }

        let result = self.store.set_flag(task_id, flag).await;
        self.reconcile(task_id, result)
    }

    async fn submit_events(&self, task_id: &str, events: Vec<Event>) -> Result<MutationOutcome> {
        let result = self.store.update_events(task_id, &events).await;
        self.reconcile(task_id, result)
    }

    /// Fold the store's answer back into the slot. Success makes the echoed
    /// task authoritative and fires commit listeners; failure keeps the
    /// optimistic copy visible under `Unpersisted` and surfaces the error.
    fn reconcile(&self, task_id: &str, result: Result<Task>) -> Result<MutationOutcome> {
        match result {
            Ok(confirmed) => {
                let project_id = confirmed.project_id.clone();
                {
                    let mut slots = self.lock_slots();
                    if let Some(slot) = slots.get_mut(task_id) {
                        slot.task = confirmed.clone();
                        slot.state = MutationState::Clean;
                    }
                }
                tracing::debug!(task_id, "mutation committed");
                for listener in self.lock_listeners().iter() {
                    listener(&project_id);
                }
                Ok(MutationOutcome::Committed(confirmed))
            }
            Err(err) => {
                let mut slots = self.lock_slots();
                if let Some(slot) = slots.get_mut(task_id) {
                    slot.state = MutationState::Unpersisted;
                }
                tracing::warn!(task_id, error = %err, "mutation not persisted");
                Err(err)
            }
        }
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<CommitListener>> {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Fetch a slot for mutation, enforcing at most one outstanding edit
fn claim<'a>(
    slots: &'a mut HashMap<String, Slot>,
    task_id: &str,
) -> Result<&'a mut Slot> {
    let slot = slots
        .get_mut(task_id)
        .ok_or_else(|| Error::NotFound(format!("task {task_id}")))?;
    if slot.state == MutationState::Pending {
        return Err(Error::Conflict(task_id.to_string()));
    }
    Ok(slot)
}

use std::sync::{PoisonError, RwLock};

use larder_store::{Mutation, MutationAction, Propagation};
use larder_types::EntityKind;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Notification that a mutation was committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Position of the commit since the catalog was opened, starting at 1.
    pub sequence: u64,
    pub kind: EntityKind,
    /// Id of the targeted record.
    pub id: String,
    pub action: MutationAction,
    /// Records touched besides the target.
    pub cascade: Propagation,
}

impl ChangeEvent {
    pub(crate) fn from_mutation(sequence: u64, mutation: &Mutation, cascade: Propagation) -> Self {
        Self {
            sequence,
            kind: mutation.kind(),
            id: mutation.target_id(),
            action: mutation.action(),
            cascade,
        }
    }
}

/// Restricts a subscription to some entity kinds.
#[derive(Clone, Debug, Default)]
pub struct ChangeFilter {
    /// If set, only events for these kinds are delivered.
    pub kinds: Option<Vec<EntityKind>>,
}

impl ChangeFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn kinds(kinds: impl IntoIterator<Item = EntityKind>) -> Self {
        Self {
            kinds: Some(kinds.into_iter().collect()),
        }
    }

    pub fn matches(&self, event: &ChangeEvent) -> bool {
        self.kinds
            .as_ref()
            .map_or(true, |kinds| kinds.contains(&event.kind))
    }
}

/// Receiver half of a change subscription.
pub type ChangeStream = broadcast::Receiver<ChangeEvent>;

struct Subscriber {
    filter: ChangeFilter,
    sender: broadcast::Sender<ChangeEvent>,
}

/// Fans committed changes out to subscribers.
pub(crate) struct ChangeRouter {
    subscribers: RwLock<Vec<Subscriber>>,
    capacity: usize,
}

impl ChangeRouter {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    pub(crate) fn subscribe(&self, filter: ChangeFilter) -> ChangeStream {
        let (sender, rx) = broadcast::channel(self.capacity);
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscriber { filter, sender });
        rx
    }

    /// Deliver `event` to matching subscribers, dropping those whose
    /// receivers are gone.
    pub(crate) fn route(&self, event: &ChangeEvent) {
        let mut subs = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        subs.retain(|sub| {
            if sub.filter.matches(event) {
                sub.sender.send(event.clone()).is_ok()
            } else {
                sub.sender.receiver_count() > 0
            }
        });
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

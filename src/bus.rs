// Synchronous publish/subscribe between the transport, the per-channel step
// selectors and whatever sink renders sound.
//
// Caller contract: a handler must not subscribe or unsubscribe on the topic
// it is being dispatched for. Dispatch runs over a snapshot of the list, so
// such changes only take effect for the next publish.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::audio_api::SoundEvent;
use crate::shared::{OwnerId, TickEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    Tick,
    Sound,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Tick(TickEvent),
    Sound(SoundEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Tick(_) => Topic::Tick,
            Event::Sound(_) => Topic::Sound,
        }
    }
}

pub type Handler = Rc<dyn Fn(&Event)>;

struct Subscription {
    owner: OwnerId,
    handler: Handler,
}

#[derive(Default)]
pub struct EventBus {
    topics: RefCell<HashMap<Topic, Vec<Subscription>>>,
}

impl EventBus {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Deliver `event` to every current subscriber of its topic, in
    /// subscription order. Nobody listening means the event is dropped.
    pub fn publish(&self, event: &Event) {
        let handlers: Vec<Handler> = match self.topics.borrow().get(&event.topic()) {
            Some(subs) => subs.iter().map(|s| Rc::clone(&s.handler)).collect(),
            None => return,
        };
        for handler in handlers {
            handler(event);
        }
    }

    pub fn subscribe(&self, topic: Topic, owner: OwnerId, handler: Handler) {
        self.topics
            .borrow_mut()
            .entry(topic)
            .or_default()
            .push(Subscription { owner, handler });
    }

    /// Remove one handler. Returns false if it was not registered under
    /// `owner` for `topic`.
    pub fn unsubscribe(&self, topic: Topic, owner: OwnerId, handler: &Handler) -> bool {
        let mut topics = self.topics.borrow_mut();
        let Some(subs) = topics.get_mut(&topic) else {
            return false;
        };
        let before = subs.len();
        subs.retain(|s| !(s.owner == owner && Rc::ptr_eq(&s.handler, handler)));
        before != subs.len()
    }

    /// Drop every handler `owner` registered, on any topic.
    pub fn unsubscribe_owner(&self, owner: OwnerId) {
        for subs in self.topics.borrow_mut().values_mut() {
            subs.retain(|s| s.owner != owner);
        }
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.topics.borrow().get(&topic).map_or(0, Vec::len)
    }

    /// Teardown: forget every subscription.
    pub fn clear(&self) {
        self.topics.borrow_mut().clear();
    }
}

//! Test doubles for the scheduler and nodes.

use crate::{
    types::{BlockId, Message, Payload, Vote},
    Activity, Error, Index, Node, Reporter, Time,
};
use std::sync::{Arc, Mutex};

/// Reporter that keeps every activity in order.
#[derive(Clone, Default)]
pub struct Recorder {
    activities: Arc<Mutex<Vec<Activity>>>,
}

impl Recorder {
    pub fn activities(&self) -> Vec<Activity> {
        self.activities.lock().unwrap().clone()
    }
}

impl Reporter for Recorder {
    type Activity = Activity;

    async fn report(&mut self, activity: Self::Activity) {
        self.activities.lock().unwrap().push(activity);
    }
}

/// Node that, at the first tick, sends `target` a vote for a block nobody proposed.
pub struct Impostor {
    pub index: Index,
    pub target: Index,
}

impl Node for Impostor {
    fn index(&self) -> Index {
        self.index
    }

    fn at_time(&mut self, t: Time) -> Vec<Message> {
        if t != 0 {
            return Vec::new();
        }
        vec![Message {
            from: self.index,
            to: self.target,
            payload: Payload::Vote(Vote {
                sender: self.index,
                block: BlockId::from([0xff; BlockId::SIZE]),
            }),
        }]
    }

    fn on_message_received(&mut self, _: Message) -> Result<Vec<Message>, Error> {
        Ok(Vec::new())
    }
}

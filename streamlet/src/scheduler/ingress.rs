use crate::{types::Message, Error, Index, Time};
use futures::{
    channel::{mpsc, oneshot},
    SinkExt,
};

/// Requests the [Scheduler](super::Scheduler) makes of a node actor.
pub enum Request {
    /// Invoke the node for a scheduler tick.
    AtTime {
        t: Time,
        responder: oneshot::Sender<Vec<Message>>,
    },

    /// Deliver a message addressed to the node.
    Deliver {
        message: Message,
        responder: oneshot::Sender<Result<Vec<Message>, Error>>,
    },
}

/// Ingress mailbox for a node [Actor](super::actor::Actor).
pub struct Mailbox {
    index: Index,
    sender: mpsc::Sender<Request>,
}

impl Mailbox {
    pub(super) fn new(index: Index, sender: mpsc::Sender<Request>) -> Self {
        Self { index, sender }
    }

    /// Index of the node behind this mailbox.
    pub fn index(&self) -> Index {
        self.index
    }

    /// Invoke the node at time `t` and wait for the messages it produces.
    pub async fn at_time(&mut self, t: Time) -> Result<Vec<Message>, Error> {
        let (responder, receiver) = oneshot::channel();
        self.sender
            .send(Request::AtTime { t, responder })
            .await
            .map_err(|_| Error::NodeStopped(self.index))?;
        receiver.await.map_err(|_| Error::NodeStopped(self.index))
    }

    /// Deliver `message` and wait for the messages the node produces in response.
    pub async fn deliver(&mut self, message: Message) -> Result<Vec<Message>, Error> {
        let (responder, receiver) = oneshot::channel();
        self.sender
            .send(Request::Deliver { message, responder })
            .await
            .map_err(|_| Error::NodeStopped(self.index))?;
        receiver.await.map_err(|_| Error::NodeStopped(self.index))?
    }
}

use super::ingress::{Mailbox, Request};
use crate::Node;
use commonware_runtime::{Handle, Spawner};
use futures::{channel::mpsc, StreamExt};
use tracing::debug;

/// Task that owns a single node and serves requests from the scheduler one at a time.
pub struct Actor<E: Spawner, N: Node> {
    context: E,
    node: N,
    mailbox: mpsc::Receiver<Request>,
}

impl<E: Spawner, N: Node> Actor<E, N> {
    pub fn new(context: E, node: N, mailbox_size: usize) -> (Self, Mailbox) {
        let (sender, receiver) = mpsc::channel(mailbox_size);
        let mailbox = Mailbox::new(node.index(), sender);
        (
            Self {
                context,
                node,
                mailbox: receiver,
            },
            mailbox,
        )
    }

    /// Spawn the actor. The node is handed back once every [Mailbox] is dropped.
    pub fn start(self) -> Handle<N> {
        self.context.clone().spawn(|_| self.run())
    }

    async fn run(mut self) -> N {
        while let Some(request) = self.mailbox.next().await {
            match request {
                Request::AtTime { t, responder } => {
                    let _ = responder.send(self.node.at_time(t));
                }
                Request::Deliver { message, responder } => {
                    let _ = responder.send(self.node.on_message_received(message));
                }
            }
        }
        debug!(index = self.node.index(), "mailbox closed");
        self.node
    }
}

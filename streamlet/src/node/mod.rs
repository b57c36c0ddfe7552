//! Participants of a simulation.

use crate::{
    types::{Block, Message},
    Elector, Error, Index, Time,
};
use honest::HonestNode;
use offline::OfflineNode;
use rand::RngCore;

pub mod honest;
pub mod notarized;
pub mod offline;

/// Capability set every participant exposes to the [Scheduler](crate::Scheduler).
///
/// Nodes never touch the message queue directly. They return the messages they want to
/// send and the scheduler routes them.
pub trait Node: Send + 'static {
    /// Index of this node in the population.
    fn index(&self) -> Index;

    /// Called once at every scheduler tick.
    fn at_time(&mut self, t: Time) -> Vec<Message>;

    /// Called for every message addressed to this node.
    ///
    /// Protocol-level rejections yield no messages. An `Err` signals a broken contract
    /// and halts the run.
    fn on_message_received(&mut self, message: Message) -> Result<Vec<Message>, Error>;

    /// Blocks this node considers permanently committed, in epoch order.
    fn finalized(&self) -> &[Block] {
        &[]
    }
}

impl<N: Node + ?Sized> Node for Box<N> {
    fn index(&self) -> Index {
        (**self).index()
    }

    fn at_time(&mut self, t: Time) -> Vec<Message> {
        (**self).at_time(t)
    }

    fn on_message_received(&mut self, message: Message) -> Result<Vec<Message>, Error> {
        (**self).on_message_received(message)
    }

    fn finalized(&self) -> &[Block] {
        (**self).finalized()
    }
}

/// A population member of either built-in variant.
pub enum Participant<R: RngCore + Send + 'static, E: Elector> {
    Honest(HonestNode<R, E>),
    Offline(OfflineNode<E>),
}

impl<R: RngCore + Send + 'static, E: Elector> Node for Participant<R, E> {
    fn index(&self) -> Index {
        match self {
            Participant::Honest(node) => node.index(),
            Participant::Offline(node) => node.index(),
        }
    }

    fn at_time(&mut self, t: Time) -> Vec<Message> {
        match self {
            Participant::Honest(node) => node.at_time(t),
            Participant::Offline(node) => node.at_time(t),
        }
    }

    fn on_message_received(&mut self, message: Message) -> Result<Vec<Message>, Error> {
        match self {
            Participant::Honest(node) => node.on_message_received(message),
            Participant::Offline(node) => node.on_message_received(message),
        }
    }

    fn finalized(&self) -> &[Block] {
        match self {
            Participant::Honest(node) => node.finalized(),
            Participant::Offline(node) => node.finalized(),
        }
    }
}

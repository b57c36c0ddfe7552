use super::Node;
use crate::{types::Message, Config, Elector, Error, Index, Time};
use tracing::debug;

/// A node that never sends or processes anything.
///
/// It only counts the epochs in which it was the elected leader, which bounds the progress
/// the rest of the population can make.
pub struct OfflineNode<E: Elector> {
    index: Index,
    config: Config,
    elector: E,
    leader_count: u64,
}

impl<E: Elector> OfflineNode<E> {
    pub fn new(index: Index, elector: E, config: Config) -> Self {
        Self {
            index,
            config,
            elector,
            leader_count: 0,
        }
    }

    /// Number of epochs this node was elected to lead (and skipped).
    pub fn leader_count(&self) -> u64 {
        self.leader_count
    }
}

impl<E: Elector> Node for OfflineNode<E> {
    fn index(&self) -> Index {
        self.index
    }

    fn at_time(&mut self, t: Time) -> Vec<Message> {
        let epoch = self.config.epoch(t);
        if self.config.is_epoch_start(t)
            && self.elector.leader(epoch, self.config.node_count) == self.index
        {
            debug!(index = self.index, epoch, "skipping leadership");
            self.leader_count += 1;
        }
        Vec::new()
    }

    fn on_message_received(&mut self, _: Message) -> Result<Vec<Message>, Error> {
        Ok(Vec::new())
    }
}

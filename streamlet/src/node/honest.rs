use super::{notarized::Notarized, Node};
use crate::{
    types::{Block, BlockId, Message, Payload, Vote},
    Config, Elector, Epoch, Error, Index, Time,
};
use bytes::Bytes;
use rand::RngCore;
use std::collections::HashSet;
use tracing::{debug, info, trace};

/// Return the index of the last block to finalize in `chain` (ordered root first), if any.
///
/// The chain is scanned from the leaf in consecutive, non-overlapping groups of three. The
/// first group whose epochs are consecutive finalizes everything up to and including its
/// oldest block.
pub fn finalizable(chain: &[&Block]) -> Option<usize> {
    chain.rchunks_exact(3).enumerate().find_map(|(group, blocks)| {
        let consecutive =
            blocks[1].epoch == blocks[0].epoch + 1 && blocks[2].epoch == blocks[1].epoch + 1;
        consecutive.then(|| chain.len() - 3 * (group + 1))
    })
}

/// A node that follows the protocol.
pub struct HonestNode<R: RngCore + Send + 'static, E: Elector> {
    context: R,
    index: Index,
    participants: Vec<Index>,
    config: Config,
    elector: E,

    current: Option<Block>,
    votes: usize,
    voters: HashSet<Index>,

    notarized: Notarized,
    finalized: Vec<Block>,
    committed: HashSet<Block>,
}

impl<R: RngCore + Send + 'static, E: Elector> HonestNode<R, E> {
    /// Create a node at `index`, drawing block identifiers from `context`.
    pub fn new(context: R, index: Index, elector: E, config: Config) -> Self {
        let participants = (0..config.node_count).collect();
        Self {
            context,
            index,
            participants,
            config,
            elector,
            current: None,
            votes: 0,
            voters: HashSet::new(),
            notarized: Notarized::default(),
            finalized: Vec::new(),
            committed: HashSet::new(),
        }
    }

    /// Last proposal adopted.
    pub fn current(&self) -> Option<&Block> {
        self.current.as_ref()
    }

    /// Votes counted for the current proposal.
    pub fn votes(&self) -> usize {
        self.votes
    }

    pub fn notarized(&self) -> &Notarized {
        &self.notarized
    }

    fn head(&self) -> Option<BlockId> {
        self.notarized.head().map(|block| block.id)
    }

    fn broadcast(&self, payload: Payload) -> Vec<Message> {
        self.participants
            .iter()
            .map(|to| Message {
                from: self.index,
                to: *to,
                payload: payload.clone(),
            })
            .collect()
    }

    fn propose(&mut self, epoch: Epoch) -> Block {
        let id = BlockId::random(&mut self.context);
        if epoch == 0 {
            return Block::genesis(id);
        }
        let content = Bytes::from(format!("placeholder content for epoch {epoch}"));
        Block::new(id, epoch, self.head(), content)
    }

    fn handle_proposal(&mut self, block: Block) -> Vec<Message> {
        let head = self.head();
        let extends = block.parent == head;
        let id = block.id;
        let epoch = block.epoch;
        self.current = Some(block);
        self.votes = 0;
        self.voters.clear();
        if !extends {
            debug!(
                index = self.index,
                epoch,
                %id,
                ?head,
                "proposal does not extend longest notarized chain"
            );
            return Vec::new();
        }
        debug!(index = self.index, epoch, %id, "voting");
        self.broadcast(Payload::Vote(Vote {
            sender: self.index,
            block: id,
        }))
    }

    fn handle_vote(&mut self, vote: Vote) -> Result<(), Error> {
        let Some(current) = &self.current else {
            return Err(Error::VoteWithoutProposal(vote.sender));
        };
        if !self.voters.insert(vote.sender) {
            trace!(index = self.index, sender = vote.sender, "duplicate vote");
            return Ok(());
        }
        if vote.block != current.id {
            return Ok(());
        }
        self.votes += 1;
        if self.votes != self.config.quorum() {
            return Ok(());
        }

        // Notarize and re-evaluate every chain
        let block = current.clone();
        info!(
            index = self.index,
            epoch = block.epoch,
            id = %block.id,
            "notarized"
        );
        self.notarized.insert(block);
        self.finalize();
        Ok(())
    }

    /// Apply the finalization rule to every notarized chain.
    pub fn finalize(&mut self) {
        let mut changed = false;
        for chain in self.notarized.chains() {
            let Some(last) = finalizable(&chain) else {
                continue;
            };
            for block in &chain[..=last] {
                if !self.committed.insert((*block).clone()) {
                    continue;
                }
                info!(
                    index = self.index,
                    epoch = block.epoch,
                    id = %block.id,
                    "finalized"
                );
                self.finalized.push((*block).clone());
                changed = true;
            }
        }
        if changed {
            self.finalized.sort_by_key(|block| block.epoch);
        }
    }
}

impl<R: RngCore + Send + 'static, E: Elector> Node for HonestNode<R, E> {
    fn index(&self) -> Index {
        self.index
    }

    fn at_time(&mut self, t: Time) -> Vec<Message> {
        let epoch = self.config.epoch(t);
        if !self.config.is_epoch_start(t)
            || self.elector.leader(epoch, self.config.node_count) != self.index
        {
            return Vec::new();
        }
        let block = self.propose(epoch);
        debug!(
            index = self.index,
            epoch,
            id = %block.id,
            parent = ?block.parent,
            "proposing"
        );
        self.broadcast(Payload::Block(block))
    }

    fn on_message_received(&mut self, message: Message) -> Result<Vec<Message>, Error> {
        match message.payload {
            Payload::Block(block) => Ok(self.handle_proposal(block)),
            Payload::Vote(vote) => {
                self.handle_vote(vote)?;
                Ok(Vec::new())
            }
        }
    }

    fn finalized(&self) -> &[Block] {
        &self.finalized
    }
}

//! Simulate [Streamlet](https://eprint.iacr.org/2020/088) consensus over discrete time.
//!
//! # Overview
//!
//! A fixed population of nodes runs the Streamlet protocol in synchronous rounds. Each round
//! (an epoch) spans `2Δ` time units and has exactly one leader, selected by a deterministic
//! [Elector]. A [Scheduler] drives a virtual clock: at every epoch boundary it asks each node
//! for the messages it wants to send, then routes messages through a FIFO queue until no node
//! has anything left to say. Only then does time advance.
//!
//! Nodes are polymorphic over the [Node] capability set. [HonestNode] follows the protocol;
//! [OfflineNode] ignores everything and exists to exercise liveness under faults.
//!
//! # Protocol
//!
//! At the start of epoch `e`, the leader `l`:
//! * Finds the head of the longest chain in its local notarized DAG
//! * Broadcasts a block for `e` extending that head (genesis if `e == 0`)
//!
//! Upon receiving a proposal `b`:
//! * Adopt `b` as the current block, resetting its vote tally
//! * If `b` extends the head of the longest locally notarized chain, broadcast `vote(b)`
//!
//! Upon receiving `2f+1` votes from distinct senders for the current block:
//! * Mark the block as notarized and link it to its notarized parent
//! * For every root-to-leaf chain, if three blocks with consecutive epochs `e-2, e-1, e` are
//!   found (scanning from the leaf in groups of three), finalize the chain up to and including
//!   the block at `e-2`
//!
//! # Safety and Liveness
//!
//! With `n >= 2f+1` honest participants, the union of all finalized lists forms a single chain
//! (see [audit]). When every epoch has an honest leader, a run of `B` epochs finalizes `B - 1`
//! blocks (the trailing two epochs are notarized but lack a confirming successor).

use thiserror::Error;

pub mod audit;
mod config;
pub use config::Config;
mod elector;
pub use elector::{Elector, Hashed, RoundRobin};
pub mod node;
pub use node::{honest::HonestNode, offline::OfflineNode, Node, Participant};
pub mod reporter;
pub use reporter::{Activity, Logger, Reporter};
mod scheduler;
pub use scheduler::Scheduler;
pub mod types;

#[cfg(test)]
pub mod mocks;

/// Epoch is a monotonically increasing protocol round with exactly one leader.
pub type Epoch = u64;

/// Index of a participant in the fixed node population.
pub type Index = u32;

/// Virtual time, measured in units of `Δ`.
pub type Time = u64;

/// Errors that can occur while configuring or running a simulation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("epoch duration must be greater than zero")]
    InvalidEpochDuration,
    #[error("epoch duration ({0}) overflows the epoch length")]
    EpochDurationOverflow(Time),
    #[error("epoch budget must be greater than zero")]
    InvalidEpochBudget,
    #[error("node count ({0}) must exceed max dishonest ({1})")]
    InsufficientNodes(u32, u32),
    #[error("vote from {0} received before any proposal")]
    VoteWithoutProposal(Index),
    #[error("node {0} stopped")]
    NodeStopped(Index),
    #[error("time overflows after {0}")]
    TimeOverflow(Time),
}

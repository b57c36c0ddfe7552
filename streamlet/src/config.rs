use crate::{Epoch, Error, Time};
use tracing::warn;

/// Parameters shared by the [Scheduler](crate::Scheduler) and every node of a run.
///
/// All participants must be constructed from identical values.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of nodes in the population.
    pub node_count: u32,

    /// Assumed upper bound on faulty nodes (`f`).
    ///
    /// Progress requires `node_count >= 2f+1` (otherwise a quorum can never form).
    pub max_dishonest: u32,

    /// Network delay bound `Δ`. An epoch spans `2Δ` time units.
    pub epoch_duration: Time,

    /// Virtual time at which the run begins.
    pub start_time: Time,

    /// Last epoch to simulate.
    pub epoch_budget: Epoch,

    /// Maximum number of requests buffered in a node's mailbox.
    pub mailbox_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_count: 10,
            max_dishonest: 3,
            epoch_duration: 1,
            start_time: 0,
            epoch_budget: 100,
            mailbox_size: 1024,
        }
    }
}

impl Config {
    /// Reject values that make a run meaningless.
    pub fn validate(&self) -> Result<(), Error> {
        if self.epoch_duration == 0 {
            return Err(Error::InvalidEpochDuration);
        }
        if self.epoch_duration.checked_mul(2).is_none() {
            return Err(Error::EpochDurationOverflow(self.epoch_duration));
        }
        if self.epoch_budget == 0 {
            return Err(Error::InvalidEpochBudget);
        }
        if self.node_count <= self.max_dishonest {
            return Err(Error::InsufficientNodes(
                self.node_count,
                self.max_dishonest,
            ));
        }
        if (self.node_count as usize) < self.quorum() {
            warn!(
                node_count = self.node_count,
                quorum = self.quorum(),
                "quorum exceeds node count, no block can be notarized"
            );
        }
        if !self.is_epoch_start(self.start_time) {
            warn!(
                start_time = self.start_time,
                epoch_length = self.epoch_length(),
                "start time is not on an epoch boundary, no block will be proposed"
            );
        }
        Ok(())
    }

    /// Number of distinct votes required to notarize a block (`2f+1`).
    pub fn quorum(&self) -> usize {
        2 * self.max_dishonest as usize + 1
    }

    /// Time units spanned by one epoch (`2Δ`).
    ///
    /// Only meaningful for a configuration that passed [Config::validate].
    pub fn epoch_length(&self) -> Time {
        2 * self.epoch_duration
    }

    /// First instant of the epoch after the one containing `t`.
    pub fn next_epoch(&self, t: Time) -> Result<Time, Error> {
        t.checked_add(self.epoch_length()).ok_or(Error::TimeOverflow(t))
    }

    /// Epoch containing time `t`.
    pub fn epoch(&self, t: Time) -> Epoch {
        t / self.epoch_length()
    }

    /// Whether `t` is the first instant of its epoch.
    pub fn is_epoch_start(&self, t: Time) -> bool {
        t % self.epoch_length() == 0
    }
}

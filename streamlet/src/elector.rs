use crate::{Epoch, Index};
use sha2::{Digest, Sha256};

/// Elector selects the leader of an epoch.
///
/// Implementations must be deterministic: every node (and any test harness predicting
/// leadership) must derive the same leader for the same epoch.
pub trait Elector: Clone + Send + 'static {
    /// Return the leader of `epoch` among `participants` nodes (in `[0, participants)`).
    fn leader(&self, epoch: Epoch, participants: u32) -> Index;
}

/// Rotate leadership through the population in index order.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoundRobin;

impl Elector for RoundRobin {
    fn leader(&self, epoch: Epoch, participants: u32) -> Index {
        (epoch % participants as u64) as Index
    }
}

/// Select the leader from the hash of the epoch.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hashed;

impl Elector for Hashed {
    fn leader(&self, epoch: Epoch, participants: u32) -> Index {
        let digest = Sha256::digest(epoch.to_be_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        (u64::from_be_bytes(prefix) % participants as u64) as Index
    }
}

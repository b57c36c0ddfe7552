//! Records exchanged between nodes.

use crate::{Epoch, Index};
use bytes::{Buf, BufMut, Bytes};
use commonware_codec::{varint::UInt, EncodeSize, Error, Read, ReadExt, Write};
use commonware_utils::hex;
use rand::RngCore;
use std::fmt;

/// Maximum size (in bytes) of the content carried by a block.
pub const MAX_CONTENT_SIZE: usize = 1024;

/// Opaque identifier of a [Block].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId([u8; BlockId::SIZE]);

impl BlockId {
    /// Length of an identifier in bytes.
    pub const SIZE: usize = 16;

    /// Draw a fresh identifier from the provided randomness.
    pub fn random(rng: &mut impl RngCore) -> Self {
        let mut id = [0u8; Self::SIZE];
        rng.fill_bytes(&mut id);
        Self(id)
    }
}

impl From<[u8; BlockId::SIZE]> for BlockId {
    fn from(value: [u8; BlockId::SIZE]) -> Self {
        Self(value)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex(&self.0))
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex(&self.0))
    }
}

impl Write for BlockId {
    fn write(&self, writer: &mut impl BufMut) {
        self.0.write(writer);
    }
}

impl EncodeSize for BlockId {
    fn encode_size(&self) -> usize {
        Self::SIZE
    }
}

impl Read for BlockId {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &()) -> Result<Self, Error> {
        Ok(Self(<[u8; Self::SIZE]>::read(reader)?))
    }
}

/// A proposal for some epoch, extending (at most) one parent.
///
/// Blocks are immutable values. Two copies of the same block received from different
/// sources compare equal over all fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Block {
    /// Unique identifier of the block.
    pub id: BlockId,

    /// Epoch in which the block was proposed.
    pub epoch: Epoch,

    /// Block this one extends (absent for genesis).
    pub parent: Option<BlockId>,

    /// Opaque payload (absent for genesis).
    pub content: Option<Bytes>,
}

impl Block {
    /// Create the genesis block (epoch 0, no parent, no content).
    pub fn genesis(id: BlockId) -> Self {
        Self {
            id,
            epoch: 0,
            parent: None,
            content: None,
        }
    }

    /// Create a block for `epoch` extending `parent`.
    pub fn new(id: BlockId, epoch: Epoch, parent: Option<BlockId>, content: Bytes) -> Self {
        Self {
            id,
            epoch,
            parent,
            content: Some(content),
        }
    }
}

impl Write for Block {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        UInt(self.epoch).write(writer);
        self.parent.write(writer);
        self.content.write(writer);
    }
}

impl EncodeSize for Block {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + UInt(self.epoch).encode_size()
            + self.parent.encode_size()
            + self.content.encode_size()
    }
}

impl Read for Block {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &()) -> Result<Self, Error> {
        let id = BlockId::read(reader)?;
        let epoch = UInt::read(reader)?.into();
        let parent = Option::<BlockId>::read(reader)?;
        let content = if bool::read(reader)? {
            Some(Bytes::read_cfg(reader, &(..=MAX_CONTENT_SIZE).into())?)
        } else {
            None
        };
        Ok(Self {
            id,
            epoch,
            parent,
            content,
        })
    }
}

/// Endorsement of a block by a single node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Vote {
    /// Node casting the vote.
    pub sender: Index,

    /// Block being endorsed.
    pub block: BlockId,
}

impl Write for Vote {
    fn write(&self, writer: &mut impl BufMut) {
        self.sender.write(writer);
        self.block.write(writer);
    }
}

impl EncodeSize for Vote {
    fn encode_size(&self) -> usize {
        self.sender.encode_size() + self.block.encode_size()
    }
}

impl Read for Vote {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &()) -> Result<Self, Error> {
        let sender = Index::read(reader)?;
        let block = BlockId::read(reader)?;
        Ok(Self { sender, block })
    }
}

/// Content carried by a [Message].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// A leader's proposal.
    Block(Block),
    /// A vote for a proposal.
    Vote(Vote),
}

impl Write for Payload {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Payload::Block(block) => {
                0u8.write(writer);
                block.write(writer);
            }
            Payload::Vote(vote) => {
                1u8.write(writer);
                vote.write(writer);
            }
        }
    }
}

impl EncodeSize for Payload {
    fn encode_size(&self) -> usize {
        1 + match self {
            Payload::Block(block) => block.encode_size(),
            Payload::Vote(vote) => vote.encode_size(),
        }
    }
}

impl Read for Payload {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &()) -> Result<Self, Error> {
        let tag = <u8>::read(reader)?;
        match tag {
            0 => Ok(Payload::Block(Block::read(reader)?)),
            1 => Ok(Payload::Vote(Vote::read(reader)?)),
            _ => Err(Error::Invalid("streamlet::types::Payload", "Invalid type")),
        }
    }
}

/// A unicast envelope. Broadcasts are expressed as one message per recipient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Node that produced the message.
    pub from: Index,

    /// Node the message is addressed to.
    pub to: Index,

    /// Proposal or vote being delivered.
    pub payload: Payload,
}

impl Write for Message {
    fn write(&self, writer: &mut impl BufMut) {
        self.from.write(writer);
        self.to.write(writer);
        self.payload.write(writer);
    }
}

impl EncodeSize for Message {
    fn encode_size(&self) -> usize {
        self.from.encode_size() + self.to.encode_size() + self.payload.encode_size()
    }
}

impl Read for Message {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &()) -> Result<Self, Error> {
        let from = Index::read(reader)?;
        let to = Index::read(reader)?;
        let payload = Payload::read(reader)?;
        Ok(Self { from, to, payload })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::Block(block) => match block.parent {
                Some(parent) => write!(
                    f,
                    "{} -> {}: block(epoch={}, id={}, parent={})",
                    self.from, self.to, block.epoch, block.id, parent
                ),
                None => write!(
                    f,
                    "{} -> {}: block(epoch={}, id={})",
                    self.from, self.to, block.epoch, block.id
                ),
            },
            Payload::Vote(vote) => write!(
                f,
                "{} -> {}: vote(sender={}, block={})",
                self.from, self.to, vote.sender, vote.block
            ),
        }
    }
}

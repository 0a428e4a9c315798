//! On-disk record format for a single tree node

use crate::model::TreeNode;
use crate::{Error, Result};

/// Type tag stored in front of every record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordType {
    Inner,
    Leaf,
}

impl RecordType {
    pub fn as_byte(&self) -> u8 {
        match self {
            RecordType::Inner => 0,
            RecordType::Leaf => 1,
        }
    }

    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(RecordType::Inner),
            1 => Some(RecordType::Leaf),
            _ => None,
        }
    }

    fn of(node: &TreeNode) -> Self {
        match node {
            TreeNode::Inner(_) => RecordType::Inner,
            TreeNode::Leaf(_) => RecordType::Leaf,
        }
    }
}

/// A typed, serialized node ready to be compressed into a snapshot
#[derive(Clone, Debug)]
pub struct Record {
    pub record_type: RecordType,
    /// bincode-encoded node (uncompressed)
    pub data: Vec<u8>,
}

impl Record {
    pub fn from_node(node: &TreeNode) -> Result<Self> {
        node.check_kind()?;
        Ok(Record {
            record_type: RecordType::of(node),
            data: bincode::serialize(node)?,
        })
    }

    /// Decode the node, checking it against the type tag
    pub fn to_node(&self) -> Result<TreeNode> {
        let node: TreeNode = bincode::deserialize(&self.data)?;
        if RecordType::of(&node) != self.record_type {
            return Err(Error::Corruption(format!(
                "Record tagged {:?} decodes to {:?}",
                self.record_type,
                node.kind()
            )));
        }
        node.check_kind()?;
        Ok(node)
    }

    /// Compress the record for storage
    pub fn compress(&self, level: i32) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(self.data.len() / 2 + 1);
        output.push(self.record_type.as_byte());
        output.extend(zstd::encode_all(self.data.as_slice(), level)?);
        Ok(output)
    }

    /// Decompress a record read from storage
    pub fn decompress(data: &[u8]) -> Result<Self> {
        let (tag, body) = data
            .split_first()
            .ok_or_else(|| Error::Corruption("Empty record".into()))?;

        let record_type = RecordType::from_byte(*tag)
            .ok_or_else(|| Error::Corruption(format!("Invalid record type: {}", tag)))?;

        Ok(Record {
            record_type,
            data: zstd::decode_all(body)?,
        })
    }
}

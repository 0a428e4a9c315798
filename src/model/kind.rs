//! Node kind classification
//!
//! The label strings and the order of [`NodeKind::LEAF_KINDS`] are a stable
//! contract: rendered diffs print the labels and summaries print one count
//! per leaf kind in exactly this order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a state tree node
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Branching node. Rendered as "Account Node" for the account state tree.
    Inner,
    AccountRoot,
    DirectoryNode,
    RippleState,
    Offer,
    LedgerHashes,
    Amendments,
    FeeSettings,
    Ticket,
    SignerList,
    PayChannel,
    Escrow,
    Check,
    DepositPreauth,
}

impl NodeKind {
    /// Label used for inner nodes in rendered diffs
    pub const INNER_LABEL: &'static str = "Account Node";

    /// Leaf kinds in canonical summary order
    pub const LEAF_KINDS: [NodeKind; 13] = [
        NodeKind::AccountRoot,
        NodeKind::DirectoryNode,
        NodeKind::RippleState,
        NodeKind::Offer,
        NodeKind::LedgerHashes,
        NodeKind::Amendments,
        NodeKind::FeeSettings,
        NodeKind::Ticket,
        NodeKind::SignerList,
        NodeKind::PayChannel,
        NodeKind::Escrow,
        NodeKind::Check,
        NodeKind::DepositPreauth,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Inner => Self::INNER_LABEL,
            NodeKind::AccountRoot => "AccountRoot",
            NodeKind::DirectoryNode => "DirectoryNode",
            NodeKind::RippleState => "RippleState",
            NodeKind::Offer => "Offer",
            NodeKind::LedgerHashes => "LedgerHashes",
            NodeKind::Amendments => "Amendments",
            NodeKind::FeeSettings => "FeeSettings",
            NodeKind::Ticket => "Ticket",
            NodeKind::SignerList => "SignerList",
            NodeKind::PayChannel => "PayChannel",
            NodeKind::Escrow => "Escrow",
            NodeKind::Check => "Check",
            NodeKind::DepositPreauth => "DepositPreauth",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        if label == Self::INNER_LABEL {
            return Some(NodeKind::Inner);
        }
        Self::LEAF_KINDS.into_iter().find(|k| k.label() == label)
    }

    /// Ledger entry type code carried by leaves of this kind
    pub fn entry_type(&self) -> Option<u16> {
        let code = match self {
            NodeKind::Inner => return None,
            NodeKind::AccountRoot => 0x0061,
            NodeKind::DirectoryNode => 0x0064,
            NodeKind::RippleState => 0x0072,
            NodeKind::Offer => 0x006f,
            NodeKind::LedgerHashes => 0x0068,
            NodeKind::Amendments => 0x0066,
            NodeKind::FeeSettings => 0x0073,
            NodeKind::Ticket => 0x0054,
            NodeKind::SignerList => 0x0053,
            NodeKind::PayChannel => 0x0078,
            NodeKind::Escrow => 0x0075,
            NodeKind::Check => 0x0043,
            NodeKind::DepositPreauth => 0x0070,
        };
        Some(code)
    }

    pub fn from_entry_type(code: u16) -> Option<Self> {
        Self::LEAF_KINDS
            .into_iter()
            .find(|k| k.entry_type() == Some(code))
    }

    pub fn is_inner(&self) -> bool {
        matches!(self, NodeKind::Inner)
    }

    /// Position in [`NodeKind::LEAF_KINDS`], `None` for inner nodes
    pub fn leaf_index(&self) -> Option<usize> {
        Self::LEAF_KINDS.iter().position(|k| k == self)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_roundtrip() {
        assert_eq!(NodeKind::from_label("Account Node"), Some(NodeKind::Inner));
        for kind in NodeKind::LEAF_KINDS {
            assert_eq!(NodeKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(NodeKind::from_label("Nonsense"), None);
    }

    #[test]
    fn test_entry_types_are_unique() {
        for kind in NodeKind::LEAF_KINDS {
            let code = kind.entry_type().unwrap();
            assert_eq!(NodeKind::from_entry_type(code), Some(kind));
        }
        assert_eq!(NodeKind::Inner.entry_type(), None);
        assert_eq!(NodeKind::from_entry_type(0xffff), None);
    }

    #[test]
    fn test_leaf_index_follows_canonical_order() {
        assert_eq!(NodeKind::AccountRoot.leaf_index(), Some(0));
        assert_eq!(NodeKind::LedgerHashes.leaf_index(), Some(4));
        assert_eq!(NodeKind::DepositPreauth.leaf_index(), Some(12));
        assert_eq!(NodeKind::Inner.leaf_index(), None);
    }
}

//! Identity types for VECTRA participants
//!
//! Participants are addressed by a dense 0-based index: node `i` listens on
//! `base_port + i`. Identifiers are 16-bit, which is plenty for practical
//! simulation sizes while keeping the wire format compact.

use std::fmt;

/// Participant identity - 0-based index into the fixed participant set.
///
/// Internally 0-based; rendered 1-based (`P1`, `P2`, ...) wherever it is
/// shown to a human, matching the simulation's console conventions.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeId(pub u16);

impl NodeId {
    #[inline]
    pub fn new(id: u16) -> Self {
        NodeId(id)
    }

    /// Raw 0-based index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// 1-based display number (`P1` is index 0).
    #[inline]
    pub fn display_number(self) -> u32 {
        self.0 as u32 + 1
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 2] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        NodeId(u16::from_le_bytes(bytes))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.display_number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_roundtrip() {
        let id = NodeId::new(0xBEEF);
        let bytes = id.to_bytes();
        let recovered = NodeId::from_bytes(bytes);
        assert_eq!(id, recovered);
    }

    #[test]
    fn test_display_is_one_based() {
        assert_eq!(NodeId::new(0).to_string(), "P1");
        assert_eq!(NodeId::new(2).to_string(), "P3");
        assert_eq!(NodeId::new(2).index(), 2);
    }
}

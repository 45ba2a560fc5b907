//! Peer address bookkeeping.

use std::collections::BTreeSet;

/// The configured peers of this node, minus the node itself.
///
/// Addresses are `host:port` strings, trimmed, de-duplicated and kept in
/// sorted order so every cycle visits peers in the same sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerSet {
    peers: Vec<String>,
}

impl PeerSet {
    /// Build a peer set, dropping blanks and `self_addr`.
    pub fn new<I>(peers: I, self_addr: Option<String>) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let peers: BTreeSet<String> = peers
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .filter(|p| self_addr.as_deref() != Some(p.as_str()))
            .collect();

        Self {
            peers: peers.into_iter().collect(),
        }
    }

    /// Every peer.
    pub fn all(&self) -> Vec<String> {
        self.peers.clone()
    }

    /// Peers listening on `port`, i.e. the same logical role on other hosts.
    pub fn cohort(&self, port: u16) -> Vec<String> {
        self.peers
            .iter()
            .filter(|p| port_of(p) == Some(port))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

/// The port part of a `host:port` address.
pub fn port_of(addr: &str) -> Option<u16> {
    let (_, port) = addr.rsplit_once(':')?;
    port.parse().ok()
}

//! Host-authoritative replication.
//!
//! Exactly one peer runs the `BattleSession`. Every other peer sends commands
//! toward it and renders the `ReplicationMessage`s it broadcasts.

pub mod authority;
pub mod messages;
pub mod proxy;
pub mod transport;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use authority::AuthorityHost;
pub use messages::{Command, ReplicationMessage};
pub use proxy::{ApplyOutcome, ProxyPeer, ProxyReplica};
pub use transport::{Envelope, LocalNetwork, PeerEndpoint};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub u32);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer-{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Authority,
    Proxy,
}

/// Who may send a call and who receives it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcTarget {
    /// Any peer to the authority.
    AllToAuthority,
    /// Authority to every other peer.
    AuthorityToAll,
    /// Authority to proxies only.
    AuthorityToProxies,
}

impl RpcTarget {
    /// Whether only the authority may originate this call.
    pub fn requires_authority(self) -> bool {
        !matches!(self, RpcTarget::AllToAuthority)
    }
}

//! Non-authoritative peers: adopt replicated snapshots and queue log lines.

use crate::battle::state::{BattleEvent, SessionSnapshot};
use crate::errors::{GatewayError, GatewayResult};
use crate::net::messages::{decode, encode, Command, ReplicationMessage};
use crate::net::transport::PeerEndpoint;
use crate::net::{PeerId, RpcTarget};
use crate::presentation::BattleLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Same sequence as the last applied message. Ignored.
    Duplicate,
    /// Older than the last applied message. Ignored.
    Stale,
}

/// Replicated view of one session. Applying is idempotent by sequence.
#[derive(Debug, Clone, Default)]
pub struct ProxyReplica {
    last_sequence: Option<u64>,
    snapshot: Option<SessionSnapshot>,
    last_events: Vec<BattleEvent>,
    log: BattleLog,
}

impl ProxyReplica {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, message: ReplicationMessage) -> ApplyOutcome {
        if let Some(last) = self.last_sequence {
            if message.sequence == last {
                return ApplyOutcome::Duplicate;
            }
            if message.sequence < last {
                tracing::debug!(sequence = message.sequence, last, "stale replication dropped");
                return ApplyOutcome::Stale;
            }
            if message.sequence > last + 1 {
                tracing::debug!(
                    sequence = message.sequence,
                    last,
                    "replication gap, adopting snapshot"
                );
            }
        }

        self.log.push_events(&message.events, &message.snapshot);
        self.last_sequence = Some(message.sequence);
        self.snapshot = Some(message.snapshot);
        self.last_events = message.events;
        ApplyOutcome::Applied
    }

    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    pub fn snapshot(&self) -> Option<&SessionSnapshot> {
        self.snapshot.as_ref()
    }

    /// Events of the most recently applied message.
    pub fn last_events(&self) -> &[BattleEvent] {
        &self.last_events
    }

    pub fn log(&self) -> &BattleLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut BattleLog {
        &mut self.log
    }
}

/// A proxy peer: sends commands to the authority and follows its broadcasts.
#[derive(Debug)]
pub struct ProxyPeer {
    endpoint: PeerEndpoint,
    replica: ProxyReplica,
}

impl ProxyPeer {
    pub fn new(endpoint: PeerEndpoint) -> Self {
        Self {
            endpoint,
            replica: ProxyReplica::new(),
        }
    }

    pub fn id(&self) -> PeerId {
        self.endpoint.id()
    }

    pub fn replica(&self) -> &ProxyReplica {
        &self.replica
    }

    pub fn replica_mut(&mut self) -> &mut ProxyReplica {
        &mut self.replica
    }

    pub async fn send_command(&self, command: Command) -> GatewayResult<()> {
        let payload = encode(&command)?;
        self.endpoint.send(RpcTarget::AllToAuthority, payload).await
    }

    /// Waits for the next broadcast and applies it.
    pub async fn sync_next(&mut self) -> GatewayResult<ApplyOutcome> {
        let envelope = self.endpoint.recv_broadcast().await?;
        if !envelope.target.requires_authority() {
            return Err(GatewayError::NotAuthority(envelope.from));
        }
        let message: ReplicationMessage = decode(&envelope.payload)?;
        Ok(self.replica.apply(message))
    }
}

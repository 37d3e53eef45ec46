//! In-process transport: reliable, ordered, role-filtered delivery over
//! tokio channels. Commands travel on a bounded `mpsc` queue to the
//! authority. Replication fans out through one unbounded `mpsc` queue per
//! proxy, so a slow proxy falls behind but never loses a step.

use crate::errors::{GatewayError, GatewayResult};
use crate::net::{PeerId, Role, RpcTarget};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub from: PeerId,
    pub target: RpcTarget,
    pub payload: Vec<u8>,
}

/// Outbound queues of every joined proxy.
type ProxyQueues = Arc<Mutex<Vec<(PeerId, mpsc::UnboundedSender<Envelope>)>>>;

/// Hands out endpoints. The first peer to join is the authority.
#[derive(Debug)]
pub struct LocalNetwork {
    authority: PeerId,
    to_authority: mpsc::Sender<Envelope>,
    authority_inbox: Option<mpsc::Receiver<Envelope>>,
    proxies: ProxyQueues,
    next_peer: u32,
}

impl LocalNetwork {
    /// `capacity` bounds the command queue toward the authority.
    pub fn new(capacity: usize) -> Self {
        let (to_authority, authority_inbox) = mpsc::channel(capacity);
        Self {
            authority: PeerId(0),
            to_authority,
            authority_inbox: Some(authority_inbox),
            proxies: Arc::new(Mutex::new(Vec::new())),
            next_peer: 0,
        }
    }

    pub fn authority(&self) -> PeerId {
        self.authority
    }

    pub fn join(&mut self) -> PeerEndpoint {
        let id = PeerId(self.next_peer);
        self.next_peer += 1;

        let (role, inbox, fan_out, subscription) = match self.authority_inbox.take() {
            Some(inbox) => (Role::Authority, Some(inbox), Some(self.proxies.clone()), None),
            None => {
                let (sender, receiver) = mpsc::unbounded_channel();
                self.proxies
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push((id, sender));
                (Role::Proxy, None, None, Some(receiver))
            }
        };
        tracing::debug!(peer = %id, ?role, "peer joined");

        PeerEndpoint {
            id,
            role,
            to_authority: self.to_authority.clone(),
            inbox,
            fan_out,
            subscription,
        }
    }
}

/// One peer's connection. The authority owns the command inbox and the
/// proxy queues; proxies own their receiving end. The authority does not
/// receive its own broadcasts, it already holds the state it sends.
#[derive(Debug)]
pub struct PeerEndpoint {
    id: PeerId,
    role: Role,
    to_authority: mpsc::Sender<Envelope>,
    inbox: Option<mpsc::Receiver<Envelope>>,
    fan_out: Option<ProxyQueues>,
    subscription: Option<mpsc::UnboundedReceiver<Envelope>>,
}

impl PeerEndpoint {
    pub fn id(&self) -> PeerId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_authority(&self) -> bool {
        self.role == Role::Authority
    }

    pub async fn send(&self, target: RpcTarget, payload: Vec<u8>) -> GatewayResult<()> {
        if target.requires_authority() && !self.is_authority() {
            tracing::warn!(peer = %self.id, ?target, "non-authority tried to broadcast");
            return Err(GatewayError::NotAuthority(self.id));
        }
        let envelope = Envelope {
            from: self.id,
            target,
            payload,
        };
        match target {
            RpcTarget::AllToAuthority => self
                .to_authority
                .send(envelope)
                .await
                .map_err(|_| GatewayError::ChannelClosed),
            RpcTarget::AuthorityToAll | RpcTarget::AuthorityToProxies => {
                let fan_out = self.fan_out.as_ref().ok_or(GatewayError::NotAuthority(self.id))?;
                let mut proxies = fan_out.lock().unwrap_or_else(PoisonError::into_inner);
                // Departed proxies are dropped from the fan-out.
                proxies.retain(|(peer, queue)| {
                    let delivered = queue.send(envelope.clone()).is_ok();
                    if !delivered {
                        tracing::debug!(%peer, "proxy left, removing from fan-out");
                    }
                    delivered
                });
                if proxies.is_empty() {
                    tracing::trace!(?target, "broadcast with no proxies");
                }
                Ok(())
            }
        }
    }

    /// Next command addressed to the authority.
    pub async fn recv_command(&mut self) -> GatewayResult<Envelope> {
        let inbox = self
            .inbox
            .as_mut()
            .ok_or(GatewayError::NotAuthority(self.id))?;
        inbox.recv().await.ok_or(GatewayError::ChannelClosed)
    }

    /// Next broadcast from the authority, in send order. Closed once the
    /// authority and the network are both gone.
    pub async fn recv_broadcast(&mut self) -> GatewayResult<Envelope> {
        let subscription = self.subscription.as_mut().ok_or(GatewayError::ChannelClosed)?;
        subscription.recv().await.ok_or(GatewayError::ChannelClosed)
    }
}

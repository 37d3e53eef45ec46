//! The single peer allowed to mutate a session.

use crate::battle::engine::BattleSession;
use crate::battle::state::{EventBus, TurnRng};
use crate::errors::{GatewayError, GatewayResult, RewardError};
use crate::net::messages::{decode, encode, Command, ReplicationMessage};
use crate::net::transport::PeerEndpoint;
use crate::net::{PeerId, RpcTarget};
use schema::Side;

/// Runs the session on the authority peer and broadcasts one
/// `ReplicationMessage` per applied step.
#[derive(Debug)]
pub struct AuthorityHost {
    endpoint: PeerEndpoint,
    session: BattleSession,
    rng: TurnRng,
    sequence: u64,
    /// Peer allowed to act for each side. `None` means host-driven (NPC).
    controllers: [Option<PeerId>; 2],
}

impl AuthorityHost {
    /// Fails unless `endpoint` is the network's authority.
    pub fn bind(
        endpoint: PeerEndpoint,
        session: BattleSession,
        rng: TurnRng,
        controllers: [Option<PeerId>; 2],
    ) -> GatewayResult<Self> {
        if !endpoint.is_authority() {
            return Err(GatewayError::NotAuthority(endpoint.id()));
        }
        Ok(Self {
            endpoint,
            session,
            rng,
            sequence: 0,
            controllers,
        })
    }

    pub fn session(&self) -> &BattleSession {
        &self.session
    }

    pub fn into_session(self) -> BattleSession {
        self.session
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn id(&self) -> PeerId {
        self.endpoint.id()
    }

    /// Starts the first turn and broadcasts it.
    pub async fn start(&mut self) -> GatewayResult<ReplicationMessage> {
        let bus = self.session.begin()?;
        self.publish(bus).await
    }

    /// Validates and applies a command from `from`.
    pub async fn handle_command(
        &mut self,
        from: PeerId,
        command: Command,
    ) -> GatewayResult<ReplicationMessage> {
        let result = self.apply_command(from, command);
        match result {
            Ok(bus) => self.publish(bus).await,
            Err(err) => {
                tracing::warn!(peer = %from, ?command, error = %err, "command rejected");
                Err(err)
            }
        }
    }

    fn apply_command(&mut self, from: PeerId, command: Command) -> GatewayResult<EventBus> {
        match command {
            Command::SubmitAction { side, action } => {
                self.authorize(from, side)?;
                Ok(self.session.submit_action(side, action, &mut self.rng)?)
            }
            Command::SelectReward { index } => {
                let winner = self
                    .session
                    .reward_offer()
                    .map(|offer| offer.winner())
                    .ok_or(RewardError::NoOffer)?;
                self.authorize(from, winner)?;
                Ok(self.session.select_reward(index)?)
            }
        }
    }

    /// Receives and applies the next command from the network.
    pub async fn serve_next(&mut self) -> GatewayResult<ReplicationMessage> {
        let envelope = self.endpoint.recv_command().await?;
        let command: Command = decode(&envelope.payload)?;
        self.handle_command(envelope.from, command).await
    }

    /// Presentation of the last step finished; advance the state machine.
    pub async fn presentation_finished(&mut self) -> GatewayResult<ReplicationMessage> {
        let bus = self.session.advance(&mut self.rng)?;
        self.publish(bus).await
    }

    /// Plays the acting NPC's turn, if an NPC is acting.
    pub async fn play_npc_turn(&mut self) -> GatewayResult<Option<ReplicationMessage>> {
        let Some(side) = self.session.acting_side() else {
            return Ok(None);
        };
        let Some(action) = self.session.pending_npc_action(&mut self.rng) else {
            return Ok(None);
        };
        let bus = self.session.submit_action(side, action, &mut self.rng)?;
        self.publish(bus).await.map(Some)
    }

    /// Picks a reward for a winner who did not choose in time.
    pub async fn auto_select_reward(&mut self) -> GatewayResult<ReplicationMessage> {
        let bus = self.session.auto_select_reward(&mut self.rng)?;
        self.publish(bus).await
    }

    /// Sends the current snapshot to proxies, e.g. for a late joiner. Carries
    /// no events and reuses the current sequence.
    pub async fn resync(&self) -> GatewayResult<()> {
        let message = ReplicationMessage {
            sequence: self.sequence,
            snapshot: self.session.snapshot(),
            events: Vec::new(),
        };
        let payload = encode(&message)?;
        self.endpoint.send(RpcTarget::AuthorityToProxies, payload).await
    }

    fn authorize(&self, from: PeerId, side: Side) -> GatewayResult<()> {
        match self.controllers[side.to_index()] {
            Some(controller) if controller == from => Ok(()),
            _ => Err(GatewayError::Unauthorized { peer: from, side }),
        }
    }

    async fn publish(&mut self, bus: EventBus) -> GatewayResult<ReplicationMessage> {
        self.sequence += 1;
        let message = ReplicationMessage {
            sequence: self.sequence,
            snapshot: self.session.snapshot(),
            events: bus.into_events(),
        };
        let payload = encode(&message)?;
        self.endpoint.send(RpcTarget::AuthorityToAll, payload).await?;
        tracing::debug!(
            sequence = message.sequence,
            status = ?message.snapshot.status,
            events = message.events.len(),
            "replicated step"
        );
        Ok(message)
    }
}

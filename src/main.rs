use clap::Parser;
use netbattle::battle::state::BattleStatus;
use netbattle::net::{AuthorityHost, Command, LocalNetwork, ProxyPeer};
use netbattle::presentation::{effect_cues, flip_gate, AnimationTracker};
use netbattle::{
    BattleAction, BattleConfig, Entity, EntityRole, Field, NpcSpecies, Roster, Side, Skill,
    SkillCategory, TurnRng,
};
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Runs a seeded demo match through a local authority and one proxy.
#[derive(Parser)]
#[command(name = "netbattle", version, long_about = None)]
struct Options {
    /// Seed for a reproducible match
    #[arg(long)]
    seed: Option<u64>,

    /// Battle config (RON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Roster templates (RON)
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Skip presentation delays
    #[arg(long)]
    fast: bool,
}

/// The demo player heals when low and otherwise attacks.
fn choose_player_action(me: &Entity, opponent: &Entity) -> BattleAction {
    let heal = me.skills().iter().copied().find(|id| {
        let skill = Skill::get(*id);
        skill.category == SkillCategory::Heal && skill.is_affordable_by(me)
    });
    match heal {
        Some(skill) if me.hit_point() * 2 < opponent.attack_power() * 3 => {
            BattleAction::UseSkill(skill)
        }
        _ => BattleAction::Attack,
    }
}

/// Applies the next replicated step, plays its effect cues and prints the
/// log once the flip gate opens.
async fn show_step(
    proxy: &mut ProxyPeer,
    tracker: &AnimationTracker,
    config: &BattleConfig,
) -> Result<(), Box<dyn Error>> {
    proxy.sync_next().await?;
    for cue in effect_cues(proxy.replica().last_events()) {
        tracing::debug!(effect = cue.effect.as_str(), target = %cue.target, "playing effect");
        let guard = tracker.begin();
        let duration = config.timing.poll_interval() * 2;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            drop(guard);
        });
    }
    flip_gate(tracker, &config.timing).await;
    let log = proxy.replica_mut().log_mut();
    while let Some(line) = log.flip() {
        println!("{}", line);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = Options::parse();
    let mut config = match &options.config {
        Some(path) => BattleConfig::load(path)?,
        None => BattleConfig::default(),
    };
    if options.fast {
        config.timing.post_action_delay_ms = 0;
        config.timing.poll_interval_ms = 1;
        config.timing.reward_auto_pick_delay_ms = 0;
    }
    let roster = match &options.roster {
        Some(path) => Roster::load(path)?,
        None => Roster::builtin(),
    };
    let mut rng = match options.seed {
        Some(seed) => TurnRng::seeded(seed),
        None => TurnRng::new_random(),
    };

    let mut field = Field::new(config.clone(), roster);
    let hero = field.spawn(EntityRole::Player).ok_or("roster has no player template")?;
    let opponents = [
        EntityRole::Npc(NpcSpecies::Slime),
        EntityRole::Npc(NpcSpecies::Wolf),
        EntityRole::Npc(NpcSpecies::Golem),
        EntityRole::FinalBoss,
    ];

    for role in opponents {
        let Some(foe) = field.spawn(role) else {
            tracing::warn!(%role, "roster has no template, skipping");
            continue;
        };
        let session = field.engage(hero, foe)?;
        let session_rng = TurnRng::seeded(rng_seed(&mut rng));

        let mut network = LocalNetwork::new(64);
        let host_endpoint = network.join();
        let mut proxy = ProxyPeer::new(network.join());
        let controllers = [Some(proxy.id()), None];
        let mut host = AuthorityHost::bind(host_endpoint, session, session_rng, controllers)?;
        let tracker = AnimationTracker::new();

        host.start().await?;
        show_step(&mut proxy, &tracker, &config).await?;

        while !host.session().is_concluded() {
            match host.session().status() {
                BattleStatus::BeforeAction if host.session().acting_side() == Some(Side::Left) => {
                    let session = host.session();
                    let (me, opponent) = (session.entity(Side::Left), session.entity(Side::Right));
                    let action = choose_player_action(me, opponent);
                    proxy
                        .send_command(Command::SubmitAction {
                            side: Side::Left,
                            action,
                        })
                        .await?;
                    host.serve_next().await?;
                }
                BattleStatus::BeforeAction => {
                    host.play_npc_turn().await?;
                }
                BattleStatus::SelectReward => {
                    tokio::time::sleep(config.timing.reward_auto_pick_delay()).await;
                    host.auto_select_reward().await?;
                }
                _ => {
                    host.presentation_finished().await?;
                }
            }
            show_step(&mut proxy, &tracker, &config).await?;
        }

        let report = field.return_from_battle(host.into_session())?;
        tracing::info!(?report, "battle returned to field");
        if report.game_clear {
            println!("*** GAME CLEAR ***");
            break;
        }
    }

    let survivors: Vec<&Entity> = field.entities().collect();
    println!("{}", serde_json::to_string_pretty(&survivors)?);
    Ok(())
}

/// Derives a per-battle seed from the match stream.
fn rng_seed(rng: &mut TurnRng) -> u64 {
    rng.range_inclusive(0, i32::MAX, "battle seed") as u64
}

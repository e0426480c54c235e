// Application state and the command loop.
//
// One `AppState` is one participant's session. The loop in `run` applies
// commands from the input channel, adopts snapshots published by other
// participants of the same room, and pushes rendered text to the output
// channel.

use counterdraft_core::dataset::CounterDataset;
use counterdraft_core::draft::{DraftError, DraftReport, DraftState};
use counterdraft_core::estimate::WinModel;
use counterdraft_core::resolver::HeroResolver;
use counterdraft_core::roles::RoleMap;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::command::{Command, HELP};
use crate::config::Config;
use crate::loader::Tables;
use crate::render;
use crate::sync::{RoomSnapshot, RoomSync};

/// What applying a command did, so the loop knows what to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The draft changed and was published.
    Changed,
    /// A commit found nothing to correct.
    Unchanged,
    /// Moved to another room; the loop must resubscribe.
    Joined,
    Show,
    Json,
    Help,
    Quit,
}

#[derive(Serialize)]
struct JsonView<'a> {
    state: &'a DraftState,
    report: DraftReport,
}

pub struct AppState {
    pub draft: DraftState,
    pub dataset: CounterDataset,
    pub roles: RoleMap,
    pub resolver: HeroResolver,
    pub model: WinModel,
    pub sync: RoomSync,
    /// This session's id within the room hub.
    pub participant: u64,
    /// Revision of the newest snapshot this session published or adopted.
    pub last_revision: u64,
}

impl AppState {
    pub fn new(config: &Config, tables: Tables, sync: RoomSync) -> Self {
        let mut draft = DraftState::new(config.draft.room.trim());
        draft.set_max_picks(config.draft.max_picks);
        let resolver = HeroResolver::new(&tables.dataset);
        let participant = sync.join();
        debug!(
            "session {} starts in room '{}' with {} known heroes",
            participant,
            draft.room,
            resolver.len()
        );
        AppState {
            draft,
            dataset: tables.dataset,
            roles: tables.roles,
            resolver,
            model: config.win_model,
            sync,
            participant,
            last_revision: 0,
        }
    }

    pub fn report(&self) -> DraftReport {
        DraftReport::compute(&self.draft, &self.dataset, Some(&self.roles), &self.model)
    }

    pub fn render(&self) -> String {
        render::report(&self.draft, &self.report())
    }

    /// The draft and its report as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&JsonView {
            state: &self.draft,
            report: self.report(),
        })
    }

    /// Apply one local command. Every change to the draft is published to
    /// the room.
    pub fn apply(&mut self, cmd: Command) -> Result<Outcome, DraftError> {
        let outcome = match cmd {
            Command::Pick { team, slot, hero } => {
                self.draft.set_pick(team, slot, &hero)?;
                self.draft.commit_pick(team, slot, &self.resolver)?;
                Outcome::Changed
            }
            Command::Type { team, slot, text } => {
                self.draft.set_pick(team, slot, &text)?;
                Outcome::Changed
            }
            Command::Clear { team, slot } => {
                self.draft.set_pick(team, slot, "")?;
                Outcome::Changed
            }
            Command::Ban { team, slot, hero } => {
                self.draft.set_ban(team, slot, &hero)?;
                self.draft.commit_ban(team, slot, &self.resolver)?;
                Outcome::Changed
            }
            Command::Commit { team, slot } => {
                if self.draft.commit_pick(team, slot, &self.resolver)? {
                    Outcome::Changed
                } else {
                    Outcome::Unchanged
                }
            }
            Command::MaxPicks(k) => {
                self.draft.set_max_picks(k);
                Outcome::Changed
            }
            Command::Reset => {
                self.draft.reset();
                Outcome::Changed
            }
            Command::Room(name) => {
                let name = name.trim();
                info!(
                    "session {} moves from room '{}' to '{}'",
                    self.participant, self.draft.room, name
                );
                self.draft.room = name.to_string();
                self.last_revision = 0;
                Outcome::Joined
            }
            Command::Show => Outcome::Show,
            Command::Json => Outcome::Json,
            Command::Help => Outcome::Help,
            Command::Quit => Outcome::Quit,
        };

        if outcome == Outcome::Changed {
            self.publish();
        }
        Ok(outcome)
    }

    fn publish(&mut self) {
        if let Some(snapshot) = self.sync.publish(self.participant, &self.draft) {
            debug!("published revision {} for room '{}'", snapshot.revision, self.draft.room);
            // Snapshots older than our own edit must not overwrite it.
            self.last_revision = snapshot.revision;
        }
    }

    /// Adopt a snapshot from another participant. Returns whether the draft
    /// was replaced; snapshots for other rooms, own echoes and stale
    /// revisions are ignored.
    pub fn apply_remote(&mut self, snapshot: RoomSnapshot) -> bool {
        if !snapshot.accept(&self.draft.room, self.participant) {
            return false;
        }
        if snapshot.revision <= self.last_revision {
            debug!(
                "ignoring stale revision {} (have {})",
                snapshot.revision, self.last_revision
            );
            return false;
        }
        debug!(
            "adopting revision {} from session {} ({})",
            snapshot.revision, snapshot.origin, snapshot.updated_at
        );
        self.last_revision = snapshot.revision;
        self.draft = snapshot.state;
        true
    }
}

async fn recv_snapshot(
    rx: &mut Option<broadcast::Receiver<RoomSnapshot>>,
) -> Result<RoomSnapshot, broadcast::error::RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Main application event loop.
///
/// Listens on two sources using `tokio::select!`:
/// - `cmd_rx`: parsed commands from the participant
/// - the room subscription (only when sync is active)
///
/// Runs until `Quit` is received or the command channel closes.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<Command>,
    out_tx: mpsc::Sender<String>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Command loop started (session {})", state.participant);

    // With sync disabled there is no receiver and the select branch waits
    // forever.
    let mut room_rx = state.sync.subscribe(&state.draft.room);
    let _ = out_tx.send(state.render()).await;

    loop {
        let mut reply = None;
        let mut resubscribe = false;

        tokio::select! {
            // --- Snapshots from the room ---
            snapshot = recv_snapshot(&mut room_rx) => {
                match snapshot {
                    Ok(snapshot) => {
                        if state.apply_remote(snapshot) {
                            reply = Some(state.render());
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("room subscription lagged, {} snapshots dropped", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("room channel closed");
                        room_rx = None;
                    }
                }
            }

            // --- Local commands ---
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    info!("Command channel closed, shutting down");
                    break;
                };
                match state.apply(cmd) {
                    Ok(Outcome::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Ok(outcome) => {
                        resubscribe = outcome == Outcome::Joined;
                        reply = Some(output_for(&state, &outcome));
                    }
                    Err(e) => {
                        warn!("command rejected: {}", e);
                        reply = Some(format!("error: {e}"));
                    }
                }
            }
        }

        // Subscribe before replying so nothing published after the reply
        // is missed.
        if resubscribe {
            room_rx = state.sync.subscribe(&state.draft.room);
        }
        if let Some(text) = reply {
            if out_tx.send(text).await.is_err() {
                info!("Output channel closed, shutting down");
                break;
            }
        }
    }

    info!("Command loop exiting");
    Ok(())
}

fn output_for(state: &AppState, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Changed | Outcome::Show => state.render(),
        Outcome::Unchanged => "nothing to correct".to_string(),
        Outcome::Joined => format!("joined room '{}'\n{}", state.draft.room, state.render()),
        Outcome::Json => match state.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!("failed to serialize draft: {}", e);
                format!("error: {e}")
            }
        },
        Outcome::Help => HELP.to_string(),
        Outcome::Quit => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

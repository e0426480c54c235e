// Room synchronization.
//
// Participants editing the same room see each other's draft state. The hub is
// an explicit value built once from config and handed to every participant;
// when `[sync]` is absent the assistant runs with `RoomSync::Disabled` and
// nothing is ever published.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use counterdraft_core::draft::DraftState;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::Config;

/// One published version of a room's draft state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    /// Hub-wide, strictly increasing publish counter.
    pub revision: u64,
    pub updated_at: DateTime<Utc>,
    /// Participant that published this snapshot.
    pub origin: u64,
    pub state: DraftState,
}

impl RoomSnapshot {
    /// Whether a participant in `room` identified by `participant` should
    /// adopt this snapshot. Own echoes and other rooms are ignored.
    pub fn accept(&self, room: &str, participant: u64) -> bool {
        self.origin != participant && self.state.room == room
    }
}

struct HubInner {
    rooms: Mutex<HashMap<String, broadcast::Sender<RoomSnapshot>>>,
    revision: AtomicU64,
    participants: AtomicU64,
    capacity: usize,
}

/// In-process fan-out of room snapshots: one broadcast channel per room.
/// Cloning shares the same hub.
#[derive(Clone)]
pub struct RoomHub {
    inner: Arc<HubInner>,
}

impl std::fmt::Debug for RoomHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomHub")
            .field("capacity", &self.inner.capacity)
            .field("revision", &self.inner.revision.load(Ordering::Relaxed))
            .finish()
    }
}

impl RoomHub {
    pub fn new(capacity: usize) -> Self {
        RoomHub {
            inner: Arc::new(HubInner {
                rooms: Mutex::new(HashMap::new()),
                revision: AtomicU64::new(0),
                participants: AtomicU64::new(0),
                capacity: capacity.max(1),
            }),
        }
    }

    /// Allocate a new participant id. Ids start at 1.
    pub fn join(&self) -> u64 {
        self.inner.participants.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn sender(&self, room: &str) -> broadcast::Sender<RoomSnapshot> {
        let mut rooms = self
            .inner
            .rooms
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        rooms
            .entry(room.to_string())
            .or_insert_with(|| broadcast::channel(self.inner.capacity).0)
            .clone()
    }

    pub fn subscribe(&self, room: &str) -> broadcast::Receiver<RoomSnapshot> {
        debug!("subscribing to room '{}'", room);
        self.sender(room).subscribe()
    }

    /// Publish `state` to its room and return the snapshot that was sent.
    pub fn publish(&self, origin: u64, state: &DraftState) -> RoomSnapshot {
        let snapshot = RoomSnapshot {
            revision: self.inner.revision.fetch_add(1, Ordering::Relaxed) + 1,
            updated_at: Utc::now(),
            origin,
            state: state.clone(),
        };
        match self.sender(&state.room).send(snapshot.clone()) {
            Ok(n) => debug!(
                "published revision {} to room '{}' ({} receivers)",
                snapshot.revision, state.room, n
            ),
            Err(_) => debug!(
                "revision {} for room '{}' had no receivers",
                snapshot.revision, state.room
            ),
        }
        snapshot
    }
}

/// Synchronization context for one participant's session.
#[derive(Debug, Clone)]
pub enum RoomSync {
    Active(RoomHub),
    Disabled,
}

impl RoomSync {
    /// `Active` when the config has a `[sync]` section, otherwise `Disabled`.
    pub fn from_config(config: &Config) -> Self {
        match &config.sync {
            Some(sync) => {
                info!("room sync enabled (capacity {})", sync.capacity);
                RoomSync::Active(RoomHub::new(sync.capacity))
            }
            None => {
                info!("room sync disabled");
                RoomSync::Disabled
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, RoomSync::Active(_))
    }

    /// Participant id for a new session. Disabled sync always returns 0.
    pub fn join(&self) -> u64 {
        match self {
            RoomSync::Active(hub) => hub.join(),
            RoomSync::Disabled => 0,
        }
    }

    pub fn subscribe(&self, room: &str) -> Option<broadcast::Receiver<RoomSnapshot>> {
        match self {
            RoomSync::Active(hub) => Some(hub.subscribe(room)),
            RoomSync::Disabled => None,
        }
    }

    pub fn publish(&self, origin: u64, state: &DraftState) -> Option<RoomSnapshot> {
        match self {
            RoomSync::Active(hub) => Some(hub.publish(origin, state)),
            RoomSync::Disabled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_config, SyncConfig};
    use counterdraft_core::draft::Team;
    use std::path::Path;
    use tokio::sync::broadcast::error::TryRecvError;

    const BASE: &str = r#"
[data]
counters = "c.csv"
lanes = "l.csv"

[draft]
room = "public"
"#;

    #[test]
    fn from_config_follows_sync_section() {
        let config = parse_config(BASE, Path::new("draft.toml")).unwrap();
        assert!(!RoomSync::from_config(&config).is_active());

        let mut config = config;
        config.sync = Some(SyncConfig { capacity: 8 });
        assert!(RoomSync::from_config(&config).is_active());
    }

    #[test]
    fn disabled_sync_is_inert() {
        let sync = RoomSync::Disabled;
        assert_eq!(sync.join(), 0);
        assert!(sync.subscribe("public").is_none());
        assert!(sync.publish(0, &DraftState::default()).is_none());
    }

    #[test]
    fn participants_get_distinct_ids() {
        let hub = RoomHub::new(4);
        let a = hub.join();
        let b = hub.clone().join();
        assert_ne!(a, b);
        assert!(a > 0 && b > 0);
    }

    #[tokio::test]
    async fn snapshots_reach_subscribers_of_the_same_room() {
        let hub = RoomHub::new(4);
        let mut public = hub.subscribe("public");
        let mut other = hub.subscribe("scrims");

        let mut state = DraftState::new("public");
        state.set_pick(Team::B, 0, "Fanny").unwrap();
        let sent = hub.publish(1, &state);

        let received = public.recv().await.unwrap();
        assert_eq!(received, sent);
        assert_eq!(received.state.team_b[0], "Fanny");
        assert!(matches!(other.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn revisions_increase_across_rooms() {
        let hub = RoomHub::new(4);
        let first = hub.publish(1, &DraftState::new("public"));
        let second = hub.publish(1, &DraftState::new("scrims"));
        assert!(second.revision > first.revision);
    }

    #[test]
    fn accept_ignores_own_echo_and_other_rooms() {
        let hub = RoomHub::new(4);
        let snapshot = hub.publish(7, &DraftState::new("public"));
        assert!(snapshot.accept("public", 8));
        assert!(!snapshot.accept("public", 7));
        assert!(!snapshot.accept("scrims", 8));
    }

    #[test]
    fn snapshot_serializes_with_timestamp() {
        let hub = RoomHub::new(4);
        let snapshot = hub.publish(3, &DraftState::new("public"));
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: RoomSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use inkboard_shared::ServerMessage;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::presence::PresenceRegistry;
use crate::store::StrokeStore;

/// Display colors handed out round-robin as participants connect.
pub const USER_COLORS: [&str; 6] = [
    "#E53935", "#43A047", "#1E88E5", "#FDD835", "#9C27B0", "#FF7043",
];

#[derive(Clone)]
pub struct AppState {
    pub room: Arc<RwLock<Room>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            room: Arc::new(RwLock::new(Room::new())),
        }
    }
}

/// The single shared room. All state-changing events across every
/// connection are serialized through the write lock guarding this struct;
/// the store and registry themselves need no further synchronization.
pub struct Room {
    pub store: StrokeStore,
    pub presence: PresenceRegistry,
    pub peers: HashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
    user_counter: u64,
}

impl Room {
    pub fn new() -> Self {
        Self {
            store: StrokeStore::new(),
            presence: PresenceRegistry::new(),
            peers: HashMap::new(),
            user_counter: 0,
        }
    }

    /// Registers a new connection: allocates a display identity, adds the
    /// peer sender, and returns the messages owed to the joining socket
    /// (its identity, then the join snapshot).
    pub fn connect(
        &mut self,
        connection_id: Uuid,
        tx: mpsc::UnboundedSender<ServerMessage>,
    ) -> (ServerMessage, ServerMessage) {
        self.peers.insert(connection_id, tx);
        self.user_counter += 1;
        let name = format!("User {}", self.user_counter);
        let color = USER_COLORS[(self.user_counter as usize - 1) % USER_COLORS.len()].to_string();
        let participant = self.presence.join(connection_id.to_string(), name, color);

        let init = ServerMessage::UserInit {
            user_id: participant.id.clone(),
            user_name: participant.name.clone(),
            user_color: participant.color.clone(),
        };
        let snapshot = ServerMessage::CanvasState {
            strokes: self.store.snapshot(),
            users: self.presence.list(),
        };
        (init, snapshot)
    }

    /// Drops a connection and its presence entry. Any stroke the
    /// participant was still drawing is simply abandoned; it never reached
    /// the store.
    pub fn disconnect(&mut self, connection_id: Uuid) {
        self.peers.remove(&connection_id);
        self.presence.leave(&connection_id.to_string());
    }

    pub fn roster_update(&self) -> ServerMessage {
        ServerMessage::UserUpdate {
            users: self.presence.list(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkboard_shared::{Point, StrokeKind};

    fn channel() -> mpsc::UnboundedSender<ServerMessage> {
        let (tx, _rx) = mpsc::unbounded_channel();
        tx
    }

    #[test]
    fn connect_assigns_round_robin_colors_and_numbered_names() {
        let mut room = Room::new();
        for n in 1..=USER_COLORS.len() + 1 {
            let (init, _) = room.connect(Uuid::new_v4(), channel());
            match init {
                ServerMessage::UserInit {
                    user_name,
                    user_color,
                    ..
                } => {
                    assert_eq!(user_name, format!("User {n}"));
                    assert_eq!(user_color, USER_COLORS[(n - 1) % USER_COLORS.len()]);
                }
                other => panic!("expected user_init, got {other:?}"),
            }
        }
    }

    #[test]
    fn join_snapshot_reflects_history_and_roster_at_that_instant() {
        let mut room = Room::new();
        let first = Uuid::new_v4();
        room.connect(first, channel());

        let a = room.store.finish_stroke(
            &first.to_string(),
            vec![Point { x: 0.0, y: 0.0 }],
            "#E53935".into(),
            3.0,
            StrokeKind::Pen,
        );
        assert_eq!(room.store.undo_last(), Some(a.id));
        let b = room.store.finish_stroke(
            &first.to_string(),
            vec![Point { x: 1.0, y: 1.0 }],
            "#E53935".into(),
            3.0,
            StrokeKind::Pen,
        );

        let (_, snapshot) = room.connect(Uuid::new_v4(), channel());
        match snapshot {
            ServerMessage::CanvasState { strokes, users } => {
                let ids: Vec<&str> = strokes.iter().map(|s| s.id.as_str()).collect();
                assert_eq!(ids, vec![b.id.as_str()]);
                assert_eq!(users.len(), 2);
            }
            other => panic!("expected canvas_state, got {other:?}"),
        }
    }

    #[test]
    fn disconnect_removes_peer_and_presence() {
        let mut room = Room::new();
        let id = Uuid::new_v4();
        room.connect(id, channel());
        assert_eq!(room.presence.len(), 1);

        room.disconnect(id);
        assert!(room.peers.is_empty());
        assert!(room.presence.is_empty());
        room.presence.update_cursor(&id.to_string(), 4.0, 4.0);
        assert!(room.presence.is_empty());
    }
}

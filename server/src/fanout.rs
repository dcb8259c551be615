use std::sync::Arc;

use inkboard_shared::ServerMessage;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::logic::Fanout;
use crate::state::Room;

/// Delivers one message to its audience. Peers whose channel has closed
/// are pruned afterwards under the write lock.
pub async fn deliver(room: &Arc<RwLock<Room>>, sender: Uuid, message: ServerMessage, fanout: Fanout) {
    match fanout {
        Fanout::All => broadcast_all(room, message).await,
        Fanout::Others => broadcast_except(room, sender, message).await,
        Fanout::SenderOnly => send_to(room, sender, message).await,
    }
}

pub async fn broadcast_all(room: &Arc<RwLock<Room>>, message: ServerMessage) {
    let mut stale = Vec::new();
    {
        let room = room.read().await;
        for (id, tx) in room.peers.iter() {
            if tx.send(message.clone()).is_err() {
                stale.push(*id);
            }
        }
    }
    prune(room, stale).await;
}

pub async fn broadcast_except(room: &Arc<RwLock<Room>>, sender: Uuid, message: ServerMessage) {
    let mut stale = Vec::new();
    {
        let room = room.read().await;
        for (id, tx) in room.peers.iter() {
            if *id == sender {
                continue;
            }
            if tx.send(message.clone()).is_err() {
                stale.push(*id);
            }
        }
    }
    prune(room, stale).await;
}

pub async fn send_to(room: &Arc<RwLock<Room>>, target: Uuid, message: ServerMessage) {
    let mut stale = Vec::new();
    {
        let room = room.read().await;
        if let Some(tx) = room.peers.get(&target) {
            if tx.send(message).is_err() {
                stale.push(target);
            }
        }
    }
    prune(room, stale).await;
}

async fn prune(room: &Arc<RwLock<Room>>, stale: Vec<Uuid>) {
    if stale.is_empty() {
        return;
    }
    let mut room = room.write().await;
    for id in stale {
        debug!(conn = %id, "pruning closed peer channel");
        room.peers.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn room_with_peers(count: usize) -> (Arc<RwLock<Room>>, Vec<(Uuid, mpsc::UnboundedReceiver<ServerMessage>)>) {
        let mut room = Room::new();
        let mut peers = Vec::new();
        for _ in 0..count {
            let id = Uuid::new_v4();
            let (tx, rx) = mpsc::unbounded_channel();
            room.connect(id, tx);
            peers.push((id, rx));
        }
        (Arc::new(RwLock::new(room)), peers)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(message) = rx.try_recv() {
            out.push(message);
        }
        out
    }

    fn probe() -> ServerMessage {
        ServerMessage::Message {
            kind: "info".into(),
            text: "probe".into(),
        }
    }

    #[tokio::test]
    async fn broadcast_except_skips_the_sender() {
        let (room, mut peers) = room_with_peers(3);
        let sender = peers[0].0;

        broadcast_except(&room, sender, probe()).await;

        assert!(drain(&mut peers[0].1).is_empty());
        assert_eq!(drain(&mut peers[1].1).len(), 1);
        assert_eq!(drain(&mut peers[2].1).len(), 1);
    }

    #[tokio::test]
    async fn broadcast_all_reaches_everyone_including_sender() {
        let (room, mut peers) = room_with_peers(3);
        let sender = peers[0].0;

        deliver(&room, sender, probe(), Fanout::All).await;

        for (_, rx) in peers.iter_mut() {
            assert_eq!(drain(rx).len(), 1);
        }
    }

    #[tokio::test]
    async fn sender_only_reaches_just_the_sender() {
        let (room, mut peers) = room_with_peers(2);
        let sender = peers[0].0;

        deliver(&room, sender, probe(), Fanout::SenderOnly).await;

        assert_eq!(drain(&mut peers[0].1).len(), 1);
        assert!(drain(&mut peers[1].1).is_empty());
    }

    #[tokio::test]
    async fn closed_peers_are_pruned_on_broadcast() {
        let (room, mut peers) = room_with_peers(2);
        let dropped = peers.remove(1);
        drop(dropped.1);

        broadcast_all(&room, probe()).await;

        let room = room.read().await;
        assert!(!room.peers.contains_key(&dropped.0));
        assert!(room.peers.contains_key(&peers[0].0));
    }
}

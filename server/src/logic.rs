use inkboard_shared::{ClientMessage, Point, ServerMessage};
use tracing::debug;
use uuid::Uuid;

use crate::state::Room;

const DEFAULT_COLOR: &str = "#1f1f1f";
const MAX_COLOR_LEN: usize = 32;

/// Who a resulting message is owed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fanout {
    /// Every connection, the sender included.
    All,
    /// Every connection except the sender.
    Others,
    /// The sender only.
    SenderOnly,
}

/// Applies one client event against the room and returns the messages to
/// deliver, paired with their audience. Malformed events yield nothing;
/// they are dropped here so they can never corrupt the store or take the
/// connection down.
pub fn apply_client_message(
    room: &mut Room,
    sender: Uuid,
    message: ClientMessage,
) -> Vec<(ServerMessage, Fanout)> {
    let sender_id = sender.to_string();
    match message {
        ClientMessage::DrawPoint {
            x,
            y,
            stroke_id,
            color,
            width,
            kind,
        } => {
            // Live-preview relay only; nothing is persisted.
            if !(x.is_finite() && y.is_finite()) || stroke_id.is_empty() {
                debug!(conn = %sender, "dropping malformed draw_point");
                return Vec::new();
            }
            vec![(
                ServerMessage::DrawPoint {
                    user_id: sender_id,
                    x,
                    y,
                    stroke_id,
                    color,
                    width,
                    kind,
                },
                Fanout::Others,
            )]
        }
        ClientMessage::CursorMove { x, y } => {
            if !(x.is_finite() && y.is_finite()) {
                return Vec::new();
            }
            room.presence.update_cursor(&sender_id, x, y);
            vec![(
                ServerMessage::CursorMove {
                    user_id: sender_id,
                    x,
                    y,
                },
                Fanout::Others,
            )]
        }
        ClientMessage::FinishStroke {
            points,
            color,
            width,
            kind,
        } => {
            let points: Vec<Point> = points.into_iter().filter(|p| p.is_finite()).collect();
            if points.is_empty() || !width.is_finite() || width <= 0.0 {
                debug!(conn = %sender, "dropping malformed finish_stroke");
                return Vec::new();
            }
            let color = sanitize_color(color);
            let stroke = room
                .store
                .finish_stroke(&sender_id, points, color, width, kind);
            debug!(conn = %sender, stroke = %stroke.id, "stroke committed");
            vec![(ServerMessage::NewStrokeFinished { stroke }, Fanout::All)]
        }
        ClientMessage::UndoRequest => match room.store.undo_last() {
            Some(stroke_id) => {
                debug!(conn = %sender, stroke = %stroke_id, "global undo");
                vec![(
                    ServerMessage::GlobalUndo {
                        stroke_id,
                        requester_id: sender_id,
                    },
                    Fanout::All,
                )]
            }
            None => vec![(info_message("Nothing to undo."), Fanout::SenderOnly)],
        },
        ClientMessage::RedoRequest => match room.store.redo_last() {
            Some(stroke_id) => {
                debug!(conn = %sender, stroke = %stroke_id, "global redo");
                vec![(
                    ServerMessage::GlobalRedo {
                        stroke_id,
                        requester_id: sender_id,
                    },
                    Fanout::All,
                )]
            }
            None => vec![(info_message("Nothing to redo."), Fanout::SenderOnly)],
        },
    }
}

fn info_message(text: &str) -> ServerMessage {
    ServerMessage::Message {
        kind: "info".to_string(),
        text: text.to_string(),
    }
}

fn sanitize_color(mut color: String) -> String {
    if color.is_empty() {
        return DEFAULT_COLOR.to_string();
    }
    if color.len() > MAX_COLOR_LEN {
        let mut cut = MAX_COLOR_LEN;
        while !color.is_char_boundary(cut) {
            cut -= 1;
        }
        color.truncate(cut);
    }
    color
}

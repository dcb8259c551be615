use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StrokeKind {
    Pen,
    Eraser,
}

/// A finished, server-canonical stroke. `id` is assigned by the server and
/// monotonically increasing; `visible` is the soft-delete flag flipped by
/// global undo/redo. History entries are never removed.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub id: String,
    pub user_id: String,
    pub points: Vec<Point>,
    pub color: String,
    pub width: f32,
    pub kind: StrokeKind,
    pub visible: bool,
}

/// One connected collaborator as seen by everyone else.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub color: String,
    pub cursor: Point,
}

/// Client events. The serde attributes shape the JSON text encoding
/// (internally `type`-tagged); binary frames use the bincode derives,
/// which encode the variant index instead of the tag.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Live-preview point for an in-flight stroke. `stroke_id` is a
    /// client-chosen provisional id; the server relays it without storing.
    DrawPoint {
        x: f32,
        y: f32,
        stroke_id: String,
        color: String,
        width: f32,
        kind: StrokeKind,
    },
    CursorMove {
        x: f32,
        y: f32,
    },
    /// Submit a completed point sequence for the authoritative history.
    FinishStroke {
        points: Vec<Point>,
        color: String,
        width: f32,
        kind: StrokeKind,
    },
    UndoRequest,
    RedoRequest,
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    UserInit {
        user_id: String,
        user_name: String,
        user_color: String,
    },
    /// Join snapshot: visible strokes in insertion order plus the roster.
    CanvasState {
        strokes: Vec<Stroke>,
        users: Vec<Participant>,
    },
    DrawPoint {
        user_id: String,
        x: f32,
        y: f32,
        stroke_id: String,
        color: String,
        width: f32,
        kind: StrokeKind,
    },
    CursorMove {
        user_id: String,
        x: f32,
        y: f32,
    },
    NewStrokeFinished {
        stroke: Stroke,
    },
    GlobalUndo {
        stroke_id: String,
        requester_id: String,
    },
    GlobalRedo {
        stroke_id: String,
        requester_id: String,
    },
    UserUpdate {
        users: Vec<Participant>,
    },
    /// Informational notice to one connection. The payload field is named
    /// `kind` on the wire, not `type`, since `type` is taken by the JSON
    /// event tag.
    Message {
        kind: String,
        text: String,
    },
}

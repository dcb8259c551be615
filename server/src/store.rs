use inkboard_shared::{Point, Stroke, StrokeKind};

/// Authoritative ordered history of finished strokes. Entries are only ever
/// appended; undo/redo flips the `visible` flag and nothing is removed for
/// the life of the process.
pub struct StrokeStore {
    strokes: Vec<Stroke>,
    next_id: u64,
}

impl Default for StrokeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StrokeStore {
    pub fn new() -> Self {
        Self {
            strokes: Vec::new(),
            next_id: 1,
        }
    }

    /// Appends a finished stroke under a fresh monotonic id and returns the
    /// canonical copy. Geometry is not validated here; the session
    /// coordinator filters malformed input before it reaches the store.
    pub fn finish_stroke(
        &mut self,
        user_id: &str,
        points: Vec<Point>,
        color: String,
        width: f32,
        kind: StrokeKind,
    ) -> Stroke {
        let stroke = Stroke {
            id: format!("s{}", self.next_id),
            user_id: user_id.to_string(),
            points,
            color,
            width,
            kind,
            visible: true,
        };
        self.next_id += 1;
        self.strokes.push(stroke.clone());
        stroke
    }

    /// Hides the newest visible stroke by insertion order, regardless of
    /// author, and returns its id. `None` means there was nothing to undo.
    pub fn undo_last(&mut self) -> Option<String> {
        let stroke = self.strokes.iter_mut().rev().find(|s| s.visible)?;
        stroke.visible = false;
        Some(stroke.id.clone())
    }

    /// Reveals the oldest hidden stroke by insertion order and returns its
    /// id. Note this is not necessarily the stroke hidden by the most
    /// recent undo; interleaved undo/redo across participants can
    /// resurrect an earlier-hidden stroke first.
    pub fn redo_last(&mut self) -> Option<String> {
        let stroke = self.strokes.iter_mut().find(|s| !s.visible)?;
        stroke.visible = true;
        Some(stroke.id.clone())
    }

    /// Visible strokes in insertion order, used to seed new joiners.
    pub fn snapshot(&self) -> Vec<Stroke> {
        self.strokes.iter().filter(|s| s.visible).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}

use inkboard_shared::{Participant, Point};

/// Roster of connected participants and their live cursor positions.
/// Insertion order is kept stable so every client renders the user list in
/// the same order.
#[derive(Default)]
pub struct PresenceRegistry {
    users: Vec<Participant>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self { users: Vec::new() }
    }

    pub fn join(&mut self, id: String, name: String, color: String) -> Participant {
        let participant = Participant {
            id,
            name,
            color,
            cursor: Point::ORIGIN,
        };
        self.users.push(participant.clone());
        participant
    }

    pub fn leave(&mut self, id: &str) {
        self.users.retain(|user| user.id != id);
    }

    /// No-op if `id` is unknown; late cursor events racing a disconnect
    /// must not re-add the participant.
    pub fn update_cursor(&mut self, id: &str, x: f32, y: f32) {
        if let Some(user) = self.users.iter_mut().find(|user| user.id == id) {
            user.cursor = Point { x, y };
        }
    }

    pub fn list(&self) -> Vec<Participant> {
        self.users.clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.users.iter().any(|user| user.id == id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

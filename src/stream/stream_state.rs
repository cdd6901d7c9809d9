/// Lifecycle of a stream. Pausing is tracked separately per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Created,
    Started,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Send,
    Receive,
    Both,
}

impl Direction {
    pub fn sends(self) -> bool {
        matches!(self, Direction::Send | Direction::Both)
    }

    pub fn receives(self) -> bool {
        matches!(self, Direction::Receive | Direction::Both)
    }
}

//! Session lifecycle and the user gestures it reacts to.

/// `Initializing -> Active -> {Committed, Cancelled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    Active,
    Committed,
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Committed | SessionState::Cancelled)
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionState::Initializing => "initializing",
            SessionState::Active => "active",
            SessionState::Committed => "committed",
            SessionState::Cancelled => "cancelled",
        }
    }
}

/// Which leaf component a gesture is aimed at.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// The only component (or the only editable one).
    Auto,
    /// Index into `Model::leaves()`.
    Component(usize),
    /// Component with this parameter prefix.
    Prefix(String),
    /// Component owning the shape vertex nearest to this data-space point.
    Cursor { x: f64, y: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Scroll { ticks: i32, target: Target },
    /// Move shape vertex `vertex` of the targeted component to `(x, y)`.
    Drag {
        target: Target,
        vertex: usize,
        x: f64,
        y: f64,
    },
    Commit,
    Cancel,
}

/// What handling one gesture did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// New parameters adopted and re-rendered.
    Updated,
    /// Gesture refused; parameters and picture are unchanged.
    Rejected(String),
    Committed,
    Cancelled,
    /// Session already terminated.
    Ignored,
}

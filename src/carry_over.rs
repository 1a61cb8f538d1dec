/// Single-slot memory linking the difficulty of one session to the next.
///
/// Written once when a session reaches its last trial, read once when the
/// next session starts. Quitting never writes to it.
pub trait CarryOverStore {
    fn last_target(&self) -> Option<usize>;
    fn set_last_target(&mut self, target_size: usize);
}

/// In-process store, lives as long as the game that owns it
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InMemoryCarryOver {
    last_target: Option<usize>,
}

impl InMemoryCarryOver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_last_target(target_size: usize) -> Self {
        Self {
            last_target: Some(target_size),
        }
    }
}

impl CarryOverStore for InMemoryCarryOver {
    fn last_target(&self) -> Option<usize> {
        self.last_target
    }

    fn set_last_target(&mut self, target_size: usize) {
        self.last_target = Some(target_size);
    }
}

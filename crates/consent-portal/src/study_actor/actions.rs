//! Custom actions for the Study actor.

#[derive(Debug, Clone)]
pub enum StudyAction {
    /// Reads the counters without changing them.
    CheckCapacity,
    /// Takes one participant slot. Fails unless the study is active and not full.
    Enroll,
    /// Gives one slot back, e.g. after a withdrawal.
    Release,
}

/// Results from StudyActions - variants match 1:1 with StudyAction
#[derive(Debug, Clone, PartialEq)]
pub enum StudyActionResult {
    CheckCapacity(Capacity),
    /// Slots left after enrolling.
    Enroll(u32),
    Release(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub enrolled: u32,
    pub max_participants: u32,
}

impl Capacity {
    pub fn remaining(&self) -> u32 {
        self.max_participants.saturating_sub(self.enrolled)
    }
}

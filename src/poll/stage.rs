use serde::Serialize;
use std::fmt;

/// Stages of one poll lifecycle, in the order they run.
///
/// Every stage except the terminal ones may also jump to [`LifecycleStage::Aborted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleStage {
    Creating,
    Active,
    Reminding,
    Closing,
    Tallying,
    Announcing,
    CleaningUp,
    Done,
    Aborted,
}

impl LifecycleStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStage::Creating => "CREATING",
            LifecycleStage::Active => "ACTIVE",
            LifecycleStage::Reminding => "REMINDING",
            LifecycleStage::Closing => "CLOSING",
            LifecycleStage::Tallying => "TALLYING",
            LifecycleStage::Announcing => "ANNOUNCING",
            LifecycleStage::CleaningUp => "CLEANING_UP",
            LifecycleStage::Done => "DONE",
            LifecycleStage::Aborted => "ABORTED",
        }
    }

    /// The stage that follows on the happy path.
    pub fn next(&self) -> Option<Self> {
        match self {
            LifecycleStage::Creating => Some(LifecycleStage::Active),
            LifecycleStage::Active => Some(LifecycleStage::Reminding),
            LifecycleStage::Reminding => Some(LifecycleStage::Closing),
            LifecycleStage::Closing => Some(LifecycleStage::Tallying),
            LifecycleStage::Tallying => Some(LifecycleStage::Announcing),
            LifecycleStage::Announcing => Some(LifecycleStage::CleaningUp),
            LifecycleStage::CleaningUp => Some(LifecycleStage::Done),
            LifecycleStage::Done | LifecycleStage::Aborted => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleStage::Done | LifecycleStage::Aborted)
    }

    pub fn can_transition_to(&self, next: LifecycleStage) -> bool {
        if next == LifecycleStage::Aborted {
            return !self.is_terminal();
        }
        self.next() == Some(next)
    }

    /// The poll is posted and has not ended badly.
    pub fn is_live(&self) -> bool {
        !matches!(self, LifecycleStage::Creating | LifecycleStage::Aborted)
    }
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

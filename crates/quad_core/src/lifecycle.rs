use std::fmt;

/// Coarse application stage as reported by the host.
///
/// Stages are ordered: an app that is `Focused` is also `Visible` and
/// `Alive`, so a single transition can cross several stages at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Dead,
    Alive,
    Visible,
    Focused,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Dead => "StageDead",
            Stage::Alive => "StageAlive",
            Stage::Visible => "StageVisible",
            Stage::Focused => "StageFocused",
        };
        f.write_str(name)
    }
}

/// Direction in which a transition passes a given stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cross {
    None,
    On,
    Off,
}

impl fmt::Display for Cross {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cross::None => "CrossNone",
            Cross::On => "CrossOn",
            Cross::Off => "CrossOff",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub from: Stage,
    pub to: Stage,
}

impl LifecycleEvent {
    pub fn new(from: Stage, to: Stage) -> Self {
        Self { from, to }
    }

    /// Whether this transition turns `stage` on, off, or leaves it alone.
    pub fn crosses(&self, stage: Stage) -> Cross {
        if self.from < stage && stage <= self.to {
            Cross::On
        } else if self.to < stage && stage <= self.from {
            Cross::Off
        } else {
            Cross::None
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

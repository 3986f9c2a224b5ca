use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%", self.0)
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// How much of `target` has been reached. Goes above 100% when the target is exceeded.
pub fn progress_percentage(current: u64, target: u64) -> Percentage {
    if target == 0 {
        return Percentage(100.);
    }
    Percentage(current as f64 / target as f64 * 100.)
}

use std::ops::{Index, IndexMut};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// A position on the planning horizon (0-based internally)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeStep(usize);

impl TimeStep {
    pub fn index(self) -> usize {
        self.0
    }

    /// 1-based step number as used in reports
    pub fn number(self) -> usize {
        self.0 + 1
    }
}

impl std::fmt::Display for TimeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.number())
    }
}

/// Ordered, immutable sequence of equally long time steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    len: usize,
    step_hours: f64,
    start: Option<DateTime<Utc>>,
}

impl Timeline {
    pub fn new(len: usize, step_hours: f64) -> Result<Self, ConfigurationError> {
        if len == 0 {
            return Err(ConfigurationError::EmptyHorizon);
        }
        if !step_hours.is_finite() || step_hours <= 0.0 {
            return Err(ConfigurationError::InvalidStepDuration(step_hours));
        }
        Ok(Self {
            len,
            step_hours,
            start: None,
        })
    }

    /// Anchor the horizon on a wall-clock start so steps can be stamped in reports
    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn step_hours(&self) -> f64 {
        self.step_hours
    }

    pub fn first(&self) -> TimeStep {
        TimeStep(0)
    }

    pub fn steps(&self) -> impl Iterator<Item = TimeStep> + Clone {
        (0..self.len).map(TimeStep)
    }

    /// Step immediately before `step`; `None` for the first step.
    ///
    /// Callers decide explicitly what the state "before the horizon" is.
    pub fn predecessor(&self, step: TimeStep) -> Option<TimeStep> {
        step.0.checked_sub(1).map(TimeStep)
    }

    /// Wall-clock interval covered by `step`, if the horizon is anchored.
    ///
    /// `None` as well when the interval falls outside the representable date range.
    pub fn interval(&self, step: TimeStep) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.start?;
        let step_ms = (self.step_hours * 3_600_000.0).round() as i64;
        let length = Duration::try_milliseconds(step_ms)?;
        let offset = Duration::try_milliseconds(step_ms.checked_mul(i64::try_from(step.0).ok()?)?)?;
        let from = start.checked_add_signed(offset)?;
        Some((from, from.checked_add_signed(length)?))
    }

    /// Total duration of the horizon in hours
    pub fn total_hours(&self) -> f64 {
        self.len as f64 * self.step_hours
    }
}

/// Fixed-size container holding one value per time step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries<T>(Vec<T>);

impl<T> TimeSeries<T> {
    /// Wrap `values`, checking that there is exactly one per step
    pub fn try_new(
        name: &'static str,
        timeline: &Timeline,
        values: Vec<T>,
    ) -> Result<Self, ConfigurationError> {
        if values.len() != timeline.len() {
            return Err(ConfigurationError::SeriesLength {
                name,
                expected: timeline.len(),
                actual: values.len(),
            });
        }
        Ok(Self(values))
    }

    pub fn from_fn(timeline: &Timeline, f: impl FnMut(TimeStep) -> T) -> Self {
        Self(timeline.steps().map(f).collect())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> Index<TimeStep> for TimeSeries<T> {
    type Output = T;

    fn index(&self, step: TimeStep) -> &T {
        &self.0[step.0]
    }
}

impl<T> IndexMut<TimeStep> for TimeSeries<T> {
    fn index_mut(&mut self, step: TimeStep) -> &mut T {
        &mut self.0[step.0]
    }
}

impl<'a, T> IntoIterator for &'a TimeSeries<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

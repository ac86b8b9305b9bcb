//! Keyed, cancellable timed actions
//!
//! Runs on the scene clock: actions only advance while the session ticks,
//! so pausing the simulation pauses them too.

use std::collections::BTreeMap;

use crate::progress;

/// Identity of a scheduled action; scheduling an existing key replaces it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKey {
    /// Finish slow-down (speed 1 -> 0)
    SlowDown,
    /// Level slide-out
    LevelSlide,
    /// Delay before the next level is built
    LevelLoad,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Timeline {
    elapsed: f32,
    duration: f32,
}

/// Progress of one action after an `advance`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub key: ActionKey,
    /// 0..=1
    pub progress: f32,
    /// Reached its duration this tick and was removed
    pub done: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    actions: BTreeMap<ActionKey, Timeline>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, key: ActionKey, duration: f32) {
        self.actions.insert(
            key,
            Timeline {
                elapsed: 0.0,
                duration,
            },
        );
    }

    /// Remove a pending action; returns whether one was pending
    pub fn cancel(&mut self, key: ActionKey) -> bool {
        self.actions.remove(&key).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.actions.clear();
    }

    pub fn is_scheduled(&self, key: ActionKey) -> bool {
        self.actions.contains_key(&key)
    }

    pub fn progress(&self, key: ActionKey) -> Option<f32> {
        self.actions
            .get(&key)
            .map(|t| progress(t.elapsed, t.duration))
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Advance every action by `dt`, in key order; finished actions are removed
    pub fn advance(&mut self, dt: f32) -> Vec<Step> {
        let steps: Vec<Step> = self
            .actions
            .iter_mut()
            .map(|(&key, timeline)| {
                timeline.elapsed += dt;
                let progress = progress(timeline.elapsed, timeline.duration);
                Step {
                    key,
                    progress,
                    done: progress >= 1.0,
                }
            })
            .collect();

        self.actions.retain(|_, t| t.elapsed < t.duration);
        steps
    }
}

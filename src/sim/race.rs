//! Lap and race progress
//!
//! Only the finish trigger mutates this. Time is counted in simulation ticks so
//! lap times are reproducible.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::SIM_DT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacePhase {
    /// Waiting for the first pass over the finish line
    NotStarted,
    /// Racing the given lap (1-based)
    InProgress { lap: u32 },
    /// All laps completed; further finish hits are ignored
    Finished,
}

/// Outcome of a pass over the finish line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LapEvent {
    /// Some checkpoint was still open; nothing changed
    Ignored,
    /// The first lap started
    Started,
    /// A lap was completed in the given number of ticks
    Completed { lap: u32, ticks: u64 },
    /// The final lap was completed
    Finished { lap: u32, ticks: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceState {
    /// Number of finish-line passes that counted; 0 before the race starts
    pub current_lap: u32,
    pub max_laps: u32,
    /// Completed lap durations in ticks
    pub lap_ticks: Vec<u64>,
    /// Tick the running lap started on
    pub lap_start: Option<u64>,
    pub finished: bool,
}

impl RaceState {
    pub fn new(max_laps: u32) -> Self {
        Self {
            current_lap: 0,
            max_laps,
            lap_ticks: Vec::new(),
            lap_start: None,
            finished: false,
        }
    }

    pub fn phase(&self) -> RacePhase {
        if self.finished {
            RacePhase::Finished
        } else if self.lap_start.is_none() {
            RacePhase::NotStarted
        } else {
            RacePhase::InProgress {
                lap: self.current_lap,
            }
        }
    }

    /// Register a pass over the finish line at tick `now`.
    ///
    /// Counts only if every checkpoint is done. The caller re-arms the
    /// checkpoints when the result is not `Ignored`.
    pub fn cross_finish(&mut self, all_checkpoints_done: bool, now: u64) -> LapEvent {
        if self.finished || !all_checkpoints_done {
            return LapEvent::Ignored;
        }

        let elapsed = self.lap_start.map(|start| now.saturating_sub(start));
        if let Some(ticks) = elapsed {
            self.lap_ticks.push(ticks);
        }
        self.lap_start = Some(now);

        let lap = self.current_lap;
        self.current_lap += 1;
        if self.current_lap > self.max_laps {
            self.finished = true;
        }

        match elapsed {
            None => LapEvent::Started,
            Some(ticks) if self.finished => LapEvent::Finished { lap, ticks },
            Some(ticks) => LapEvent::Completed { lap, ticks },
        }
    }

    /// Completed lap durations in wall-clock time
    pub fn lap_times(&self) -> Vec<Duration> {
        self.lap_ticks.iter().map(|&t| ticks_to_duration(t)).collect()
    }

    /// Time spent on the running lap
    pub fn current_lap_time(&self, now: u64) -> Duration {
        match (self.finished, self.lap_start) {
            (false, Some(start)) => ticks_to_duration(now.saturating_sub(start)),
            _ => Duration::ZERO,
        }
    }

    pub fn best_lap(&self) -> Option<Duration> {
        self.lap_ticks.iter().min().map(|&t| ticks_to_duration(t))
    }
}

pub fn ticks_to_duration(ticks: u64) -> Duration {
    Duration::from_secs_f64(ticks as f64 * SIM_DT)
}

//! Production stages and their per-order records

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::EngineError;

/// The five shop-floor steps, in workflow order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Design,
    Print,
    Cut,
    Press,
    Control,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Design,
        Stage::Print,
        Stage::Cut,
        Stage::Press,
        Stage::Control,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Design => "design",
            Stage::Print => "print",
            Stage::Cut => "cut",
            Stage::Press => "press",
            Stage::Control => "control",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == key)
            .ok_or_else(|| EngineError::UnknownStage(s.trim().to_string()))
    }
}

/// Where a stage is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    NotStarted,
    InProgress,
    Completed,
}

impl StageState {
    /// Started or completed
    pub fn is_touched(&self) -> bool {
        !matches!(self, StageState::NotStarted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StageState::NotStarted => "not_started",
            StageState::InProgress => "in_progress",
            StageState::Completed => "completed",
        }
    }
}

/// Timestamps and completion flag for one stage of one order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<NaiveDateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<NaiveDateTime>,

    #[serde(default)]
    pub completed: bool,
}

impl StageRecord {
    pub fn state(&self) -> StageState {
        if self.completed {
            StageState::Completed
        } else if self.started_at.is_some() {
            StageState::InProgress
        } else {
            StageState::NotStarted
        }
    }

    /// NotStarted/InProgress -> InProgress; restarting stamps a fresh start time
    pub fn start(&mut self, stage: Stage, now: NaiveDateTime) -> Result<(), EngineError> {
        if self.state() == StageState::Completed {
            return Err(EngineError::StageAlreadyCompleted(stage));
        }
        self.started_at = Some(now);
        self.completed = false;
        Ok(())
    }

    /// InProgress -> Completed
    pub fn complete(&mut self, stage: Stage, now: NaiveDateTime) -> Result<(), EngineError> {
        match self.state() {
            StageState::NotStarted => Err(EngineError::StageNotStarted(stage)),
            StageState::Completed => Err(EngineError::StageAlreadyCompleted(stage)),
            StageState::InProgress => {
                self.finished_at = Some(now);
                self.completed = true;
                Ok(())
            }
        }
    }
}

/// The five stage records of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StageBoard {
    pub design: StageRecord,
    pub print: StageRecord,
    pub cut: StageRecord,
    pub press: StageRecord,
    pub control: StageRecord,
}

impl StageBoard {
    pub fn get(&self, stage: Stage) -> &StageRecord {
        match stage {
            Stage::Design => &self.design,
            Stage::Print => &self.print,
            Stage::Cut => &self.cut,
            Stage::Press => &self.press,
            Stage::Control => &self.control,
        }
    }

    pub fn get_mut(&mut self, stage: Stage) -> &mut StageRecord {
        match stage {
            Stage::Design => &mut self.design,
            Stage::Print => &mut self.print,
            Stage::Cut => &mut self.cut,
            Stage::Press => &mut self.press,
            Stage::Control => &mut self.control,
        }
    }

    pub fn state(&self, stage: Stage) -> StageState {
        self.get(stage).state()
    }

    /// Stages paired with their records, in workflow order
    pub fn iter(&self) -> impl Iterator<Item = (Stage, &StageRecord)> {
        Stage::ALL.into_iter().map(move |stage| (stage, self.get(stage)))
    }

    pub fn all_completed(&self) -> bool {
        self.iter().all(|(_, record)| record.completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn record_lifecycle() {
        let mut record = StageRecord::default();
        assert_eq!(record.state(), StageState::NotStarted);

        record.start(Stage::Print, at(9)).unwrap();
        assert_eq!(record.state(), StageState::InProgress);
        assert_eq!(record.started_at, Some(at(9)));

        record.complete(Stage::Print, at(10)).unwrap();
        assert_eq!(record.state(), StageState::Completed);
        assert_eq!(record.finished_at, Some(at(10)));
    }

    #[test]
    fn restart_while_in_progress_restamps() {
        let mut record = StageRecord::default();
        record.start(Stage::Cut, at(9)).unwrap();
        record.start(Stage::Cut, at(11)).unwrap();

        assert_eq!(record.started_at, Some(at(11)));
        assert_eq!(record.state(), StageState::InProgress);
    }

    #[test]
    fn complete_without_start_fails() {
        let mut record = StageRecord::default();
        assert_eq!(
            record.complete(Stage::Press, at(9)),
            Err(EngineError::StageNotStarted(Stage::Press))
        );
        assert_eq!(record.state(), StageState::NotStarted);
    }

    #[test]
    fn completed_stage_never_regresses() {
        let mut record = StageRecord::default();
        record.start(Stage::Design, at(9)).unwrap();
        record.complete(Stage::Design, at(10)).unwrap();

        assert_eq!(
            record.start(Stage::Design, at(11)),
            Err(EngineError::StageAlreadyCompleted(Stage::Design))
        );
        assert_eq!(
            record.complete(Stage::Design, at(11)),
            Err(EngineError::StageAlreadyCompleted(Stage::Design))
        );
        assert_eq!(record.state(), StageState::Completed);
        assert_eq!(record.finished_at, Some(at(10)));
    }

    #[test]
    fn stage_parse() {
        assert_eq!("Press".parse::<Stage>(), Ok(Stage::Press));
        assert_eq!(
            "sewing".parse::<Stage>(),
            Err(EngineError::UnknownStage("sewing".to_string()))
        );
    }

    #[test]
    fn board_iterates_in_workflow_order() {
        let board = StageBoard::default();
        let stages: Vec<_> = board.iter().map(|(s, _)| s).collect();
        assert_eq!(stages, Stage::ALL.to_vec());
        assert!(!board.all_completed());
    }
}

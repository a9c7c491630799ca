//! Study session settings

use serde::{Deserialize, Serialize};

use crate::choices::Direction;
use crate::error::Result;
use crate::sampler::SampleFilter;

pub const DEFAULT_WORD_COUNT: usize = 10;
pub const DEFAULT_DISTRACTOR_POOL: usize = 10;

/// How the session batch is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Words needing review first
    #[default]
    Review,
    /// Random words passing the filter
    Random,
}

/// How the learner answers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMode {
    #[default]
    FreeText,
    MultipleChoice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudySettings {
    pub word_count: usize,
    pub selection: SelectionMode,
    pub direction: Direction,
    pub answer_mode: AnswerMode,
    /// Only used by [`SelectionMode::Random`]
    pub filter: SampleFilter,
    /// Words sampled per question to draw distractors from
    pub distractor_pool_size: usize,
}

impl Default for StudySettings {
    fn default() -> Self {
        Self {
            word_count: DEFAULT_WORD_COUNT,
            selection: SelectionMode::default(),
            direction: Direction::default(),
            answer_mode: AnswerMode::default(),
            filter: SampleFilter::default(),
            distractor_pool_size: DEFAULT_DISTRACTOR_POOL,
        }
    }
}

impl StudySettings {
    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the word count from user text, falling back to the default
    pub fn apply_word_count(&mut self, text: &str) {
        self.word_count = parse_word_count(text);
    }
}

/// Positive integer from user text, or [`DEFAULT_WORD_COUNT`]
pub fn parse_word_count(text: &str) -> usize {
    match text.trim().parse::<i64>() {
        Ok(n) if n > 0 => n as usize,
        _ => DEFAULT_WORD_COUNT,
    }
}

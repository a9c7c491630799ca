//! Study session state machine
//!
//! A session moves `Loading -> Active -> Finished`. While active it walks the
//! selected words one at a time: the learner answers (typed text or one of
//! four choices), the answer is revealed, and `advance` moves on. Every
//! graded answer is written back to the word store; a failed write is
//! reported but never undoes the in-memory step.

use chrono::Utc;
use log::{debug, info, warn};
use rand::rngs::ThreadRng;
use rand::Rng;
use serde::Serialize;

use crate::choices::{ChoiceSet, Direction};
use crate::error::{Result, StudyError};
use crate::grading::{grade, Grade};
use crate::model::VocabularyItem;
use crate::sampler::{select_random, SampleFilter};
use crate::scheduler::select_for_review;
use crate::settings::{AnswerMode, SelectionMode, StudySettings, DEFAULT_DISTRACTOR_POOL};
use crate::store::WordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Loading,
    Active,
    Finished,
}

/// A learner's answer to the current word
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Text(String),
    /// Index into the current choice set
    Choice(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerOutcome {
    pub word_id: i64,
    pub is_correct: bool,
    pub submitted: String,
    pub correct_answer: String,
    pub grade: Grade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    /// Words in the session
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
}

impl SessionSummary {
    /// Correct share of answered words, 0.0 before the first answer
    pub fn accuracy(&self) -> f64 {
        if self.answered == 0 {
            0.0
        } else {
            self.correct as f64 / self.answered as f64
        }
    }
}

pub struct SessionRunner<S, R = ThreadRng> {
    store: S,
    rng: R,
    state: SessionState,
    words: Vec<VocabularyItem>,
    /// Vocabulary distractors are drawn from
    pool: Vec<VocabularyItem>,
    distractor_pool_size: usize,
    index: usize,
    show_answer: bool,
    user_input: String,
    answered: usize,
    correct: usize,
    direction: Direction,
    answer_mode: AnswerMode,
    choices: Option<ChoiceSet>,
}

impl<S: WordStore> SessionRunner<S, ThreadRng> {
    pub fn new(store: S) -> Self {
        Self::with_rng(store, rand::thread_rng())
    }
}

impl<S: WordStore, R: Rng> SessionRunner<S, R> {
    pub fn with_rng(store: S, rng: R) -> Self {
        Self {
            store,
            rng,
            state: SessionState::Loading,
            words: Vec::new(),
            pool: Vec::new(),
            distractor_pool_size: DEFAULT_DISTRACTOR_POOL,
            index: 0,
            show_answer: false,
            user_input: String::new(),
            answered: 0,
            correct: 0,
            direction: Direction::default(),
            answer_mode: AnswerMode::default(),
            choices: None,
        }
    }

    /// Vocabulary to draw distractors from. Defaults to the session's own words.
    pub fn set_candidate_pool(&mut self, pool: Vec<VocabularyItem>) {
        self.pool = pool;
    }

    /// Select a batch from the store according to `settings` and start on it
    pub fn load(&mut self, settings: &StudySettings) -> Result<SessionState> {
        if self.state == SessionState::Finished {
            return Ok(self.state);
        }
        let words = match self.store.get_all() {
            Ok(words) => words,
            Err(e) => {
                warn!("could not load vocabulary for study: {}", e);
                self.state = SessionState::Finished;
                return Err(e.into());
            }
        };

        let batch = match settings.selection {
            SelectionMode::Review => select_for_review(&words, settings.word_count, &mut self.rng),
            SelectionMode::Random => {
                select_random(&words, settings.word_count, &settings.filter, &mut self.rng)
            }
        };
        self.distractor_pool_size = settings.distractor_pool_size;
        self.pool = words;
        Ok(self.start(batch, settings.direction, settings.answer_mode))
    }

    /// Start on a list of word ids chosen earlier; ids no longer stored are skipped
    pub fn start_with_ids(
        &mut self,
        ids: &[i64],
        direction: Direction,
        answer_mode: AnswerMode,
    ) -> Result<SessionState> {
        if self.state == SessionState::Finished {
            return Ok(self.state);
        }
        let mut words = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.store.get_by_id(id) {
                Ok(Some(word)) => words.push(word),
                Ok(None) => debug!("word {} no longer exists, skipping", id),
                Err(e) => {
                    self.state = SessionState::Finished;
                    return Err(e.into());
                }
            }
        }
        Ok(self.start(words, direction, answer_mode))
    }

    /// Begin on `words`. A finished runner stays finished; use a new one.
    pub fn start(
        &mut self,
        words: Vec<VocabularyItem>,
        direction: Direction,
        answer_mode: AnswerMode,
    ) -> SessionState {
        if self.state == SessionState::Finished {
            debug!("session already finished, ignoring start");
            return self.state;
        }
        self.words = words;
        self.direction = direction;
        self.answer_mode = answer_mode;
        self.index = 0;
        self.show_answer = false;
        self.user_input.clear();
        self.answered = 0;
        self.correct = 0;

        self.state = if self.words.is_empty() {
            SessionState::Finished
        } else {
            SessionState::Active
        };
        info!(
            "study session started: {} words, {:?}, {:?}",
            self.words.len(),
            direction,
            answer_mode
        );
        self.regenerate_choices();
        self.state
    }

    /// Grade the answer for the current word and record it.
    ///
    /// Returns `Ok(None)` when nothing happened: no active word, the answer is
    /// already shown, blank text, or a choice index that cannot be picked.
    /// If the store write fails the session has still advanced to the
    /// revealed state and the outcome is carried in the error.
    pub fn submit_answer(&mut self, submission: Submission) -> Result<Option<AnswerOutcome>> {
        if self.state != SessionState::Active || self.show_answer {
            return Ok(None);
        }
        let Some(word) = self.words.get(self.index) else {
            return Ok(None);
        };
        let word_id = word.id;
        let expected = self.direction.answer_for(word).to_string();

        let submitted = match submission {
            Submission::Text(text) if text.trim().is_empty() => return Ok(None),
            Submission::Text(text) => text,
            Submission::Choice(index) => match self.choices.as_ref().and_then(|c| c.option(index)) {
                Some(option) => option.to_string(),
                None => return Ok(None),
            },
        };

        let grade = grade(&submitted, &expected);
        let is_correct = grade.is_correct;
        self.user_input = submitted.clone();
        self.show_answer = true;
        self.answered += 1;
        if is_correct {
            self.correct += 1;
        }

        let outcome = AnswerOutcome {
            word_id,
            is_correct,
            submitted,
            correct_answer: expected,
            grade,
        };

        match self.store.record_result(word_id, is_correct, Utc::now()) {
            Ok(Some(updated)) => {
                self.words[self.index] = updated;
                Ok(Some(outcome))
            }
            Ok(None) => {
                warn!("word {} was removed during the session, result not saved", word_id);
                Ok(Some(outcome))
            }
            Err(source) => {
                warn!("failed to save result for word {}: {}", word_id, source);
                Err(StudyError::StatsNotSaved { outcome, source })
            }
        }
    }

    /// Show the answer without grading; the word then counts as skipped
    pub fn reveal(&mut self) {
        if self.state == SessionState::Active {
            self.show_answer = true;
        }
    }

    /// Move to the next word, or finish after the last one
    pub fn advance(&mut self) -> SessionState {
        if self.state != SessionState::Active {
            return self.state;
        }
        if self.index + 1 < self.words.len() {
            self.index += 1;
            self.show_answer = false;
            self.user_input.clear();
            self.regenerate_choices();
        } else {
            self.finish();
        }
        self.state
    }

    pub fn finish(&mut self) {
        if self.state != SessionState::Finished {
            let summary = self.summary();
            info!(
                "study session finished: {}/{} correct, {} of {} answered",
                summary.correct, summary.answered, summary.answered, summary.total
            );
        }
        self.state = SessionState::Finished;
        self.choices = None;
    }

    pub fn set_direction(&mut self, direction: Direction) {
        if self.direction != direction {
            self.direction = direction;
            self.regenerate_choices();
        }
    }

    pub fn set_answer_mode(&mut self, answer_mode: AnswerMode) {
        if self.answer_mode != answer_mode {
            self.answer_mode = answer_mode;
            self.regenerate_choices();
        }
    }

    fn regenerate_choices(&mut self) {
        self.choices = None;
        if self.state != SessionState::Active || self.answer_mode != AnswerMode::MultipleChoice {
            return;
        }
        let Some(word) = self.words.get(self.index) else {
            return;
        };
        let vocabulary = if self.pool.is_empty() { &self.words } else { &self.pool };
        let candidates = select_random(
            vocabulary,
            self.distractor_pool_size,
            &SampleFilter::default(),
            &mut self.rng,
        );
        self.choices = Some(ChoiceSet::generate(word, self.direction, &candidates, &mut self.rng));
    }

    // ============= Accessors =============

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn words(&self) -> &[VocabularyItem] {
        &self.words
    }

    pub fn current(&self) -> Option<&VocabularyItem> {
        match self.state {
            SessionState::Active => self.words.get(self.index),
            _ => None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn answer_mode(&self) -> AnswerMode {
        self.answer_mode
    }

    pub fn question(&self) -> Option<&str> {
        self.current().map(|w| self.direction.question_for(w))
    }

    pub fn correct_answer(&self) -> Option<&str> {
        self.current().map(|w| self.direction.answer_for(w))
    }

    /// Pronunciation, only shown when the Korean side is the question
    pub fn pronunciation_hint(&self) -> Option<&str> {
        if self.direction != Direction::Forward {
            return None;
        }
        self.current()
            .and_then(|w| w.pronunciation.as_deref())
            .filter(|p| !p.trim().is_empty())
    }

    pub fn choices(&self) -> Option<&ChoiceSet> {
        self.choices.as_ref()
    }

    pub fn show_answer(&self) -> bool {
        self.show_answer
    }

    /// Last submitted answer for the current word
    pub fn user_input(&self) -> &str {
        &self.user_input
    }

    /// 1-based position and total, e.g. `(3, 10)`
    pub fn progress(&self) -> (usize, usize) {
        if self.words.is_empty() {
            (0, 0)
        } else {
            (self.index + 1, self.words.len())
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            total: self.words.len(),
            answered: self.answered,
            correct: self.correct,
        }
    }
}

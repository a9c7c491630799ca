//! Multiple-choice option generation

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grading::answers_match;
use crate::model::VocabularyItem;

pub const CHOICE_COUNT: usize = 4;

/// Which side of the card is asked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Korean shown, meaning expected
    #[default]
    Forward,
    /// Meaning shown, Korean expected
    Reverse,
}

impl Direction {
    pub fn question_for(self, word: &VocabularyItem) -> &str {
        match self {
            Direction::Forward => &word.korean,
            Direction::Reverse => &word.meaning,
        }
    }

    pub fn answer_for(self, word: &VocabularyItem) -> &str {
        match self {
            Direction::Forward => &word.meaning,
            Direction::Reverse => &word.korean,
        }
    }
}

/// Four options for `correct`: its answer plus up to three distractors from
/// `pool`, shuffled. Missing distractors are left as empty strings.
pub fn build_choices<R>(
    correct: &VocabularyItem,
    direction: Direction,
    pool: &[VocabularyItem],
    rng: &mut R,
) -> [String; CHOICE_COUNT]
where
    R: Rng + ?Sized,
{
    let answer = direction.answer_for(correct);
    if answer.trim().is_empty() {
        warn!("word {} has no answer for {:?}", correct.id, direction);
    }

    let mut distractors: Vec<&str> = Vec::with_capacity(CHOICE_COUNT - 1);
    for candidate in pool.iter().filter(|w| w.id != correct.id) {
        let text = direction.answer_for(candidate);
        if text.trim().is_empty()
            || answers_match(text, answer)
            || distractors.iter().any(|d| answers_match(d, text))
        {
            continue;
        }
        distractors.push(text);
        if distractors.len() == CHOICE_COUNT - 1 {
            break;
        }
    }

    if distractors.len() < CHOICE_COUNT - 1 {
        debug!(
            "only {} distractors for word {}, padding with blanks",
            distractors.len(),
            correct.id
        );
    }

    let mut options: [String; CHOICE_COUNT] = Default::default();
    options[0] = answer.to_string();
    for (slot, text) in options[1..].iter_mut().zip(distractors) {
        *slot = text.to_string();
    }
    options.shuffle(rng);
    options
}

/// A generated multiple-choice question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceSet {
    pub word_id: i64,
    pub question: String,
    pub correct_answer: String,
    pub options: [String; CHOICE_COUNT],
}

impl ChoiceSet {
    pub fn generate<R>(word: &VocabularyItem, direction: Direction, pool: &[VocabularyItem], rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self {
            word_id: word.id,
            question: direction.question_for(word).to_string(),
            correct_answer: direction.answer_for(word).to_string(),
            options: build_choices(word, direction, pool, rng),
        }
    }

    pub fn correct_index(&self) -> Option<usize> {
        self.options
            .iter()
            .position(|o| !o.trim().is_empty() && answers_match(o, &self.correct_answer))
    }

    /// Blank placeholders and out-of-range indices cannot be picked
    pub fn is_selectable(&self, index: usize) -> bool {
        self.options
            .get(index)
            .is_some_and(|o| !o.trim().is_empty())
    }

    pub fn option(&self, index: usize) -> Option<&str> {
        self.is_selectable(index).then(|| self.options[index].as_str())
    }
}

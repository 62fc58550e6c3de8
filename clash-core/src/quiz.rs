//! The quiz gate in front of every teacher.
//!
//! A quiz asks a handful of randomly chosen questions from the opponent's
//! bank. Answering them all correctly beats the opponent outright; the
//! first wrong answer ends the quiz and starts a fight instead.

use crate::combat::{ActionSource, CombatEngine, EncounterOutcome};
use crate::error::EncounterError;
use crate::luck::Luck;
use crate::opponent::Opponent;
use crate::player::PlayerCharacter;
use crate::progress::Progress;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Questions asked per attempt.
pub const QUIZ_LENGTH: usize = 5;

/// Coins awarded for a perfect quiz.
pub const QUIZ_REWARD: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub answer: String,
}

impl Question {
    pub fn new(prompt: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            answer: answer.into(),
        }
    }

    pub fn accepts(&self, given: &str) -> bool {
        answers_match(&self.answer, given)
    }
}

/// Compare answers ignoring case and surrounding whitespace.
pub fn answers_match(expected: &str, given: &str) -> bool {
    expected.trim().to_lowercase() == given.trim().to_lowercase()
}

/// An opponent's ordered list of questions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn from_pairs<P, A>(pairs: impl IntoIterator<Item = (P, A)>) -> Self
    where
        P: Into<String>,
        A: Into<String>,
    {
        Self {
            questions: pairs.into_iter().map(|(p, a)| Question::new(p, a)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// The expected answer for a prompt, if the bank has it.
    pub fn answer_for(&self, prompt: &str) -> Option<&str> {
        self.questions
            .iter()
            .find(|q| q.prompt == prompt)
            .map(|q| q.answer.as_str())
    }

    /// Up to `amount` distinct questions in random order.
    pub fn draw<L: Luck>(&self, amount: usize, luck: &mut L) -> Vec<&Question> {
        luck.draw(self.questions.len(), amount)
            .into_iter()
            .filter_map(|i| self.questions.get(i))
            .collect()
    }
}

/// Answers quiz questions, one call per prompt.
pub trait AnswerSource {
    fn answer(&mut self, prompt: &str) -> String;
}

impl<F> AnswerSource for F
where
    F: FnMut(&str) -> String,
{
    fn answer(&mut self, prompt: &str) -> String {
        self(prompt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum QuizOutcome {
    InstantWin { reward: u32 },
    RoutedToCombat { correct: usize, outcome: EncounterOutcome },
}

impl QuizOutcome {
    /// Whether the opponent ended up defeated, by quiz or by combat.
    pub fn is_win(&self) -> bool {
        match self {
            QuizOutcome::InstantWin { .. } => true,
            QuizOutcome::RoutedToCombat { outcome, .. } => outcome.is_victory(),
        }
    }
}

/// Runs quizzes and hands failures to the combat engine.
#[derive(Debug, Clone)]
pub struct QuizGate {
    length: usize,
    reward: u32,
}

impl Default for QuizGate {
    fn default() -> Self {
        Self {
            length: QUIZ_LENGTH,
            reward: QUIZ_REWARD,
        }
    }
}

impl QuizGate {
    pub fn new(length: usize, reward: u32) -> Self {
        Self { length, reward }
    }

    /// Quiz the player, falling through to combat on the first miss.
    ///
    /// A bank smaller than the quiz length is asked in full.
    #[allow(clippy::too_many_arguments)]
    pub fn resolve<Q, A, L>(
        &self,
        engine: &CombatEngine,
        player: &mut PlayerCharacter,
        opponent: &mut Opponent,
        progress: &mut Progress,
        bank: &QuestionBank,
        answers: &mut Q,
        actions: &mut A,
        luck: &mut L,
    ) -> Result<QuizOutcome, EncounterError>
    where
        Q: AnswerSource + ?Sized,
        A: ActionSource + ?Sized,
        L: Luck,
    {
        if bank.is_empty() {
            return Err(EncounterError::EmptyQuestionBank {
                opponent: opponent.name().to_string(),
            });
        }

        let drawn = bank.draw(self.length, luck);
        let mut correct = 0;
        for question in drawn {
            let given = answers.answer(&question.prompt);
            if !question.accepts(&given) {
                info!(
                    target: "clash::quiz",
                    opponent = opponent.name(),
                    correct,
                    "quiz failed, entering combat"
                );
                let outcome = engine.resolve(player, opponent, progress, actions, luck)?;
                return Ok(QuizOutcome::RoutedToCombat { correct, outcome });
            }
            correct += 1;
        }

        opponent.force_defeat();
        progress.mark_defeated(opponent.id());
        player.award_coins(self.reward);
        info!(
            target: "clash::quiz",
            opponent = opponent.name(),
            reward = self.reward,
            "quiz passed"
        );
        Ok(QuizOutcome::InstantWin {
            reward: self.reward,
        })
    }
}

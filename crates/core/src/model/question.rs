use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::QuestionId;
use crate::model::tier::Tier;

//
// ─── OPERATION ─────────────────────────────────────────────────────────────────
//

/// Arithmetic operation asked in a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Operation {
    /// Operator symbol as shown to the player.
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Operation::Addition => '+',
            Operation::Subtraction => '-',
            Operation::Multiplication => '×',
            Operation::Division => '÷',
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Addition => "addition",
            Operation::Subtraction => "subtraction",
            Operation::Multiplication => "multiplication",
            Operation::Division => "division",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One arithmetic problem. Immutable; a new one is built for every turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    display_text: String,
    correct_answer: u32,
    tier: Tier,
    operation: Operation,
    operand1: u32,
    operand2: u32,
    options: Option<Vec<String>>,
}

impl Question {
    /// Builds a question from raw operands, normalising them so the answer is
    /// a non-negative whole number:
    ///
    /// - subtraction swaps the operands when `a < b`;
    /// - division treats `b` as the divisor (zero is raised to one) and rounds
    ///   `a` down to a multiple of it.
    #[must_use]
    pub fn compose(id: QuestionId, tier: Tier, operation: Operation, a: u32, b: u32) -> Self {
        let (operand1, operand2, correct_answer) = match operation {
            Operation::Addition => (a, b, a.saturating_add(b)),
            Operation::Subtraction => {
                let (hi, lo) = if a < b { (b, a) } else { (a, b) };
                (hi, lo, hi - lo)
            }
            Operation::Multiplication => (a, b, a.saturating_mul(b)),
            Operation::Division => {
                let divisor = b.max(1);
                let quotient = a / divisor;
                (divisor * quotient, divisor, quotient)
            }
        };

        Self {
            id,
            display_text: format!("{operand1} {} {operand2} = ?", operation.symbol()),
            correct_answer,
            tier,
            operation,
            operand1,
            operand2,
            options: None,
        }
    }

    /// Builds an exact division from a divisor and the quotient to reach.
    #[must_use]
    pub fn division(id: QuestionId, tier: Tier, divisor: u32, quotient: u32) -> Self {
        let divisor = divisor.max(1);
        Self::compose(
            id,
            tier,
            Operation::Division,
            divisor.saturating_mul(quotient),
            divisor,
        )
    }

    /// Attaches a fixed option list that is shown instead of generated choices.
    #[must_use]
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = Some(options);
        self
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    #[must_use]
    pub fn correct_answer(&self) -> u32 {
        self.correct_answer
    }

    /// The correct answer as it appears among the options.
    #[must_use]
    pub fn correct_answer_text(&self) -> String {
        self.correct_answer.to_string()
    }

    #[must_use]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub fn operand1(&self) -> u32 {
        self.operand1
    }

    #[must_use]
    pub fn operand2(&self) -> u32 {
        self.operand2
    }

    #[must_use]
    pub fn options(&self) -> Option<&[String]> {
        self.options.as_deref()
    }

    /// Returns true when `answer` matches the correct answer text exactly.
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> QuestionId {
        QuestionId::new(1)
    }

    #[test]
    fn subtraction_swaps_to_stay_non_negative() {
        let q = Question::compose(id(), Tier::Beginner, Operation::Subtraction, 3, 7);
        assert_eq!(q.operand1(), 7);
        assert_eq!(q.operand2(), 3);
        assert_eq!(q.display_text(), "7 - 3 = ?");
        assert_eq!(q.correct_answer(), 4);
    }

    #[test]
    fn symbols_render_per_operation() {
        let add = Question::compose(id(), Tier::Beginner, Operation::Addition, 2, 5);
        assert_eq!(add.display_text(), "2 + 5 = ?");
        assert_eq!(add.correct_answer(), 7);

        let mul = Question::compose(id(), Tier::Advanced, Operation::Multiplication, 6, 7);
        assert_eq!(mul.display_text(), "6 × 7 = ?");
        assert_eq!(mul.correct_answer(), 42);

        let div = Question::division(id(), Tier::Advanced, 4, 9);
        assert_eq!(div.display_text(), "36 ÷ 4 = ?");
        assert_eq!(div.correct_answer(), 9);
    }

    #[test]
    fn division_is_always_exact() {
        let q = Question::compose(id(), Tier::Advanced, Operation::Division, 13, 4);
        assert_eq!((q.operand1(), q.operand2(), q.correct_answer()), (12, 4, 3));

        let zero = Question::compose(id(), Tier::Advanced, Operation::Division, 5, 0);
        assert_eq!(zero.operand2(), 1);
        assert_eq!(zero.operand1() % zero.operand2(), 0);
    }

    #[test]
    fn correctness_compares_answer_text() {
        let q = Question::compose(id(), Tier::Beginner, Operation::Addition, 1, 1);
        assert!(q.is_correct("2"));
        assert!(!q.is_correct(" 2"));
        assert!(!q.is_correct("3"));
    }

    #[test]
    fn fixed_options_are_kept() {
        let q = Question::compose(id(), Tier::Beginner, Operation::Addition, 1, 1)
            .with_options(vec!["2".into(), "5".into()]);
        assert_eq!(q.options().unwrap(), ["2", "5"]);
    }
}

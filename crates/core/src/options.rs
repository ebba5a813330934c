//! Multiple-choice options around a question's correct answer.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::model::{Question, Tier};
use crate::rules::OPTION_COUNT;

/// Random draws allowed per widening round.
pub const MAX_ATTEMPTS_PER_ROUND: u32 = 100;

/// How many times the distractor range is doubled before falling back to
/// consecutive values above the answer.
pub const MAX_WIDENINGS: u32 = 3;

/// Builds the shuffled option list for `question`.
///
/// A question carrying its own non-empty option list gets it back verbatim.
/// Otherwise the list holds the correct answer plus distinct, non-negative
/// distractors drawn within the tier's range of it.
pub fn synthesize<R: Rng + ?Sized>(question: &Question, tier: Tier, rng: &mut R) -> Vec<String> {
    if let Some(fixed) = question.options() {
        if !fixed.is_empty() {
            return fixed.to_vec();
        }
    }

    let correct = question.correct_answer();
    let mut options = Vec::with_capacity(OPTION_COUNT);
    options.push(correct.to_string());

    let mut range = tier.distractor_range().max(1);
    for _ in 0..=MAX_WIDENINGS {
        draw_distractors(correct, range, rng, &mut options);
        if options.len() >= OPTION_COUNT {
            break;
        }
        range = range.saturating_mul(2);
    }
    fill_above(correct, &mut options);

    options.shuffle(rng);
    options
}

fn draw_distractors<R: Rng + ?Sized>(
    correct: u32,
    range: u32,
    rng: &mut R,
    options: &mut Vec<String>,
) {
    let mut attempts = 0;
    while options.len() < OPTION_COUNT && attempts < MAX_ATTEMPTS_PER_ROUND {
        attempts += 1;
        let offset = i64::from(rng.random_range(1..=range));
        let signed = if rng.random_bool(0.5) { offset } else { -offset };
        let Ok(candidate) = u32::try_from(i64::from(correct) + signed) else {
            continue;
        };
        push_unique(options, candidate);
    }
}

// Deterministic last resort: correct + 1, correct + 2, ...
fn fill_above(correct: u32, options: &mut Vec<String>) {
    let mut step = 1_u32;
    while options.len() < OPTION_COUNT {
        match correct.checked_add(step) {
            Some(candidate) => push_unique(options, candidate),
            None => push_unique(options, correct.saturating_sub(step)),
        }
        step = step.saturating_add(1);
    }
}

fn push_unique(options: &mut Vec<String>, candidate: u32) {
    let text = candidate.to_string();
    if !options.contains(&text) {
        options.push(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate;
    use crate::model::{Operation, QuestionId};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    /// Random source stuck at zero: every draw yields the same offset and sign.
    struct ConstantRng;

    impl rand::RngCore for ConstantRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    fn assert_valid(options: &[String], question: &Question) {
        assert_eq!(options.len(), OPTION_COUNT);
        let unique: HashSet<_> = options.iter().collect();
        assert_eq!(unique.len(), OPTION_COUNT);
        let correct = question.correct_answer_text();
        assert_eq!(options.iter().filter(|o| **o == correct).count(), 1);
        for option in options {
            assert!(option.parse::<u32>().is_ok(), "negative or garbage: {option}");
        }
    }

    #[test]
    fn generated_option_sets_are_valid() {
        let mut rng = StdRng::seed_from_u64(11);
        for tier in Tier::ALL {
            for _ in 0..500 {
                let question = generate(tier, &mut rng);
                let options = synthesize(&question, tier, &mut rng);
                assert_valid(&options, &question);
            }
        }
    }

    #[test]
    fn distractors_stay_within_the_tier_range_when_possible() {
        let mut rng = StdRng::seed_from_u64(5);
        let question =
            Question::compose(QuestionId::new(1), Tier::Beginner, Operation::Addition, 10, 10);
        for _ in 0..200 {
            let options = synthesize(&question, Tier::Beginner, &mut rng);
            for option in &options {
                let value: i64 = option.parse().unwrap();
                assert!((value - 20).abs() <= 3);
            }
        }
    }

    #[test]
    fn zero_answer_still_gets_four_options() {
        let mut rng = StdRng::seed_from_u64(3);
        let question =
            Question::compose(QuestionId::new(1), Tier::Beginner, Operation::Subtraction, 4, 4);
        assert_eq!(question.correct_answer(), 0);
        for _ in 0..200 {
            let options = synthesize(&question, Tier::Beginner, &mut rng);
            assert_valid(&options, &question);
        }
    }

    #[test]
    fn degenerate_random_source_terminates() {
        let mut rng = ConstantRng;
        let question =
            Question::compose(QuestionId::new(1), Tier::Beginner, Operation::Subtraction, 2, 2);
        let options = synthesize(&question, Tier::Beginner, &mut rng);
        assert_valid(&options, &question);
    }

    #[test]
    fn fixed_options_are_returned_verbatim() {
        let mut rng = StdRng::seed_from_u64(1);
        let fixed = vec!["3".to_string(), "1".to_string(), "2".to_string()];
        let question =
            Question::compose(QuestionId::new(1), Tier::Beginner, Operation::Addition, 1, 1)
                .with_options(fixed.clone());
        assert_eq!(synthesize(&question, Tier::Beginner, &mut rng), fixed);
    }

    #[test]
    fn empty_fixed_options_fall_back_to_generation() {
        let mut rng = StdRng::seed_from_u64(1);
        let question =
            Question::compose(QuestionId::new(1), Tier::Advanced, Operation::Addition, 1, 1)
                .with_options(Vec::new());
        let options = synthesize(&question, Tier::Advanced, &mut rng);
        assert_valid(&options, &question);
    }
}

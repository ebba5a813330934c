//! Random arithmetic questions per difficulty tier.

use rand::Rng;

use crate::model::{Operation, Question, QuestionId, Tier};

/// Maps a uniform roll in `[0, 1)` to the operation asked at `tier`.
///
/// - beginner: addition / subtraction, even split
/// - intermediate: addition 0.4, subtraction 0.4, multiplication 0.2
/// - advanced: addition 0.3, subtraction 0.3, multiplication 0.3, division 0.1
#[must_use]
pub fn pick_operation(tier: Tier, roll: f64) -> Operation {
    match tier {
        Tier::Beginner => {
            if roll < 0.5 {
                Operation::Addition
            } else {
                Operation::Subtraction
            }
        }
        Tier::Intermediate => {
            if roll < 0.4 {
                Operation::Addition
            } else if roll < 0.8 {
                Operation::Subtraction
            } else {
                Operation::Multiplication
            }
        }
        Tier::Advanced => {
            if roll < 0.3 {
                Operation::Addition
            } else if roll < 0.6 {
                Operation::Subtraction
            } else if roll < 0.9 {
                Operation::Multiplication
            } else {
                Operation::Division
            }
        }
    }
}

/// Generates a fresh question for `tier`.
///
/// Results are never negative and divisions are always exact.
pub fn generate<R: Rng + ?Sized>(tier: Tier, rng: &mut R) -> Question {
    let id = QuestionId::new(rng.random());
    let operation = pick_operation(tier, rng.random::<f64>());

    match (tier, operation) {
        (Tier::Beginner, op) => {
            let a = rng.random_range(1..=10);
            let b = rng.random_range(1..=10);
            Question::compose(id, tier, op, a, b)
        }
        (Tier::Intermediate, Operation::Multiplication) => {
            let a = rng.random_range(1..=10);
            let b = rng.random_range(1..=10);
            Question::compose(id, tier, Operation::Multiplication, a, b)
        }
        (Tier::Intermediate, op) => {
            let a = rng.random_range(1..=20);
            let b = rng.random_range(1..=20);
            Question::compose(id, tier, op, a, b)
        }
        (Tier::Advanced, Operation::Multiplication) => {
            let a = rng.random_range(1..=12);
            let b = rng.random_range(1..=12);
            Question::compose(id, tier, Operation::Multiplication, a, b)
        }
        (Tier::Advanced, Operation::Division) => {
            let divisor = rng.random_range(1..=10);
            let quotient = rng.random_range(1..=10);
            Question::division(id, tier, divisor, quotient)
        }
        (Tier::Advanced, op) => {
            let a = rng.random_range(1..=50);
            let b = rng.random_range(1..=20);
            Question::compose(id, tier, op, a, b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn operation_boundaries() {
        assert_eq!(pick_operation(Tier::Beginner, 0.49), Operation::Addition);
        assert_eq!(pick_operation(Tier::Beginner, 0.5), Operation::Subtraction);

        assert_eq!(pick_operation(Tier::Intermediate, 0.39), Operation::Addition);
        assert_eq!(pick_operation(Tier::Intermediate, 0.4), Operation::Subtraction);
        assert_eq!(
            pick_operation(Tier::Intermediate, 0.8),
            Operation::Multiplication
        );

        assert_eq!(pick_operation(Tier::Advanced, 0.29), Operation::Addition);
        assert_eq!(pick_operation(Tier::Advanced, 0.3), Operation::Subtraction);
        assert_eq!(pick_operation(Tier::Advanced, 0.6), Operation::Multiplication);
        assert_eq!(pick_operation(Tier::Advanced, 0.9), Operation::Division);
        assert_eq!(pick_operation(Tier::Advanced, 0.999), Operation::Division);
    }

    #[test]
    fn generated_questions_respect_tier_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let q = generate(Tier::Beginner, &mut rng);
            assert!(matches!(
                q.operation(),
                Operation::Addition | Operation::Subtraction
            ));
            assert!((1..=10).contains(&q.operand1()));
            assert!((1..=10).contains(&q.operand2()));
            assert!(q.operand1() >= q.operand2() || q.operation() == Operation::Addition);

            let q = generate(Tier::Intermediate, &mut rng);
            assert_ne!(q.operation(), Operation::Division);
            let max = if q.operation() == Operation::Multiplication {
                10
            } else {
                20
            };
            assert!(q.operand1() <= max && q.operand2() <= max);

            let q = generate(Tier::Advanced, &mut rng);
            match q.operation() {
                Operation::Multiplication => {
                    assert!(q.operand1() <= 12 && q.operand2() <= 12);
                }
                Operation::Division => {
                    assert!((1..=10).contains(&q.operand2()));
                    assert!((1..=10).contains(&q.correct_answer()));
                }
                _ => assert!(q.operand1() <= 50 && q.operand2() <= 50),
            }
        }
    }

    #[test]
    fn answers_are_consistent_and_divisions_exact() {
        let mut rng = StdRng::seed_from_u64(2024);
        for tier in Tier::ALL {
            for _ in 0..1_000 {
                let q = generate(tier, &mut rng);
                assert_eq!(q.tier(), tier);
                let (a, b) = (q.operand1(), q.operand2());
                let expected = match q.operation() {
                    Operation::Addition => a + b,
                    Operation::Subtraction => a - b,
                    Operation::Multiplication => a * b,
                    Operation::Division => {
                        assert_eq!(a % b, 0);
                        a / b
                    }
                };
                assert_eq!(q.correct_answer(), expected);
                assert!(q.display_text().ends_with(" = ?"));
            }
        }
    }

    #[test]
    fn advanced_tier_eventually_asks_every_operation() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(generate(Tier::Advanced, &mut rng).operation());
        }
        assert_eq!(seen.len(), 4);
    }
}

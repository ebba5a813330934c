//! Terminal play-through of one math session.

use std::error::Error;
use std::time::Duration;

use dino_core::model::{GameType, Tier};
use dino_core::rules::FEEDBACK_DELAY;
use services::{Answer, AnswerOutcome, AppServices, GameSession, SoundEffects};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

type Input = Lines<BufReader<Stdin>>;

enum Reply {
    Line(String),
    TimedOut,
    Closed,
}

async fn read_reply(input: &mut Input, limit: Option<Duration>) -> std::io::Result<Reply> {
    let line = match limit {
        Some(limit) => match tokio::time::timeout(limit, input.next_line()).await {
            Ok(line) => line?,
            Err(_) => return Ok(Reply::TimedOut),
        },
        None => input.next_line().await?,
    };
    Ok(line.map_or(Reply::Closed, Reply::Line))
}

fn show_question(session: &GameSession) {
    let progress = session.progress();
    println!();
    println!(
        "Question {}/{}   score {}   lives {}",
        session.question_index() + 1,
        progress.total,
        progress.score,
        "♥".repeat(usize::from(progress.lives)),
    );
    if let Some(limit) = session.time_limit() {
        println!("You have {} seconds.", limit.as_secs());
    }
    println!("  {}", session.question().display_text());
    for (i, option) in session.options().iter().enumerate() {
        println!("  [{}] {option}", i + 1);
    }
    println!("Pick 1-{}, or type the answer (p = pause, q = quit):", session.options().len());
}

/// Numbered picks map to the option text; anything else is taken literally.
fn to_answer(session: &GameSession, line: &str) -> Answer {
    let trimmed = line.trim();
    trimmed
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| session.options().get(i))
        .map_or_else(|| Answer::selected(trimmed), |text| Answer::selected(text.clone()))
}

fn show_feedback(outcome: &AnswerOutcome) {
    if outcome.is_correct {
        println!("Correct! +{}", outcome.points);
    } else if outcome.answer == Answer::TimedOut {
        println!("Time's up! The answer was {}.", outcome.question.correct_answer_text());
    } else {
        println!("Oops! The answer was {}.", outcome.question.correct_answer_text());
    }
}

fn show_result(outcome: &AnswerOutcome) {
    let state = outcome.state;
    println!();
    println!("Game over!");
    println!(
        "Score {}   correct {}   wrong {}",
        state.current_score(),
        state.correct_count(),
        state.wrong_count()
    );
    if let Some(reward) = &outcome.reward {
        println!("Stars: {}", "★".repeat(usize::from(reward.stars.value())));
        if reward.new_high_score {
            println!("New high score!");
        }
        if !reward.unlocked.is_empty() {
            println!("Achievements unlocked: {}", reward.unlocked.len());
        }
    }
}

/// Plays one session at `tier` on stdin/stdout.
pub async fn run(services: &AppServices, tier: Tier) -> Result<(), Box<dyn Error>> {
    let game_loop = services.game_loop();
    let sound = services.sound();
    let mut session = services.start_game(GameType::Math, tier).await?;
    let store = services.profiles().load().await?;
    println!("Hi {}! Let's do some {tier} math.", store.display_name());

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    sound.start_music();

    loop {
        show_question(&session);
        let answer = match read_reply(&mut input, session.time_limit()).await? {
            Reply::Closed => break,
            Reply::TimedOut => Answer::TimedOut,
            Reply::Line(line) => match line.trim() {
                "q" => break,
                "p" => {
                    game_loop.toggle_pause(&mut session)?;
                    println!("Paused. Press p to continue.");
                    loop {
                        match read_reply(&mut input, None).await? {
                            Reply::Line(line) if line.trim() == "p" => break,
                            Reply::Closed => {
                                sound.stop_music();
                                return Ok(());
                            }
                            _ => {}
                        }
                    }
                    game_loop.toggle_pause(&mut session)?;
                    continue;
                }
                _ => to_answer(&session, &line),
            },
        };

        let outcome = game_loop.answer(&mut session, answer).await?;
        show_feedback(&outcome);
        match outcome.continuation {
            Some(token) => {
                tokio::time::sleep(FEEDBACK_DELAY).await;
                game_loop.advance(&mut session, token)?;
            }
            None => {
                show_result(&outcome);
                break;
            }
        }
    }

    sound.stop_music();
    Ok(())
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dino_core::model::{GameSummary, GameType, PlayerProfile, Tier};
use dino_core::time::fixed_now;
use services::{
    Answer, AppServices, Clock, GameLoopService, SessionError, SoundEffect, SoundEffects,
};
use storage::repository::{
    GameSummaryRepository, GameSummaryRow, InMemoryRepository, ProfileRepository, StorageError,
};

#[derive(Default)]
struct RecordingSound {
    played: Mutex<Vec<SoundEffect>>,
}

impl RecordingSound {
    fn played(&self) -> Vec<SoundEffect> {
        self.played.lock().unwrap().clone()
    }
}

impl SoundEffects for RecordingSound {
    fn play(&self, effect: SoundEffect) {
        self.played.lock().unwrap().push(effect);
    }

    fn start_music(&self) {}

    fn stop_music(&self) {}
}

/// Summary store whose first append fails.
struct FlakySummaries {
    inner: InMemoryRepository,
    failed_once: AtomicBool,
}

#[async_trait]
impl GameSummaryRepository for FlakySummaries {
    async fn append_summary(&self, summary: &GameSummary) -> Result<i64, StorageError> {
        if !self.failed_once.swap(true, Ordering::SeqCst) {
            return Err(StorageError::Connection("disk unplugged".into()));
        }
        self.inner.append_summary(summary).await
    }

    async fn get_summary(&self, id: i64) -> Result<GameSummary, StorageError> {
        self.inner.get_summary(id).await
    }

    async fn list_summaries(
        &self,
        game: Option<GameType>,
        limit: u32,
    ) -> Result<Vec<GameSummaryRow>, StorageError> {
        self.inner.list_summaries(game, limit).await
    }
}

#[tokio::test]
async fn game_loop_plays_sounds_and_persists_results() {
    let repo = InMemoryRepository::new();
    repo.save_profile(&PlayerProfile::explorer()).await.unwrap();
    let sound = Arc::new(RecordingSound::default());
    let loop_svc = GameLoopService::new(
        Clock::fixed(fixed_now()),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        sound.clone(),
    )
    .with_seed(42);

    let mut session = loop_svc
        .start_session(GameType::Math, Tier::Intermediate)
        .await
        .unwrap();
    let mut answered = 0;
    let last = loop {
        let answer = if answered % 2 == 0 {
            Answer::Selected(session.question().correct_answer_text())
        } else {
            Answer::TimedOut
        };
        answered += 1;
        let outcome = loop_svc.answer(&mut session, answer).await.unwrap();
        match outcome.continuation {
            Some(token) => loop_svc.advance(&mut session, token).unwrap(),
            None => break outcome,
        }
    };

    // correct, wrong, correct, wrong, correct, wrong: third wrong ends it
    assert_eq!(answered, 6);
    assert_eq!(last.state.lives(), 0);
    assert_eq!(last.state.current_score(), 60);
    let reward = last.reward.expect("reward applied");
    assert_eq!(reward.stars.value(), 1);

    let played = sound.played();
    assert_eq!(played.first(), Some(&SoundEffect::Click));
    assert_eq!(played.last(), Some(&SoundEffect::Achievement));
    assert_eq!(
        played.iter().filter(|e| **e == SoundEffect::Wrong).count(),
        3
    );

    let profile = repo.get_profile().await.unwrap().unwrap();
    assert_eq!(profile.star_total(), 1);
    assert_eq!(profile.high_score(GameType::Math), 60);
    assert_eq!(profile.last_played(), Some(GameType::Math));

    let summary_id = last.summary_id.expect("summary persisted");
    let summary = repo.get_summary(summary_id).await.unwrap();
    assert_eq!(summary.correct(), 3);
    assert_eq!(summary.wrong(), 3);
}

#[tokio::test]
async fn failed_summary_write_can_be_retried_without_double_reward() {
    let repo = InMemoryRepository::new();
    repo.save_profile(&PlayerProfile::explorer()).await.unwrap();
    let summaries = Arc::new(FlakySummaries {
        inner: repo.clone(),
        failed_once: AtomicBool::new(false),
    });
    let loop_svc = GameLoopService::new(
        Clock::fixed(fixed_now()),
        Arc::new(repo.clone()),
        summaries,
        Arc::new(RecordingSound::default()),
    )
    .with_seed(7);

    let mut session = loop_svc
        .start_session(GameType::Math, Tier::Beginner)
        .await
        .unwrap();
    let err = loop {
        let answer = Answer::Selected(session.question().correct_answer_text());
        match loop_svc.answer(&mut session, answer).await {
            Ok(outcome) => {
                let token = outcome.continuation.expect("session still running");
                loop_svc.advance(&mut session, token).unwrap();
            }
            Err(err) => break err,
        }
    };
    assert!(matches!(err, SessionError::Storage(_)));
    assert!(session.is_complete());
    assert!(session.reward().is_some());
    assert!(session.summary_id().is_none());

    let id = loop_svc.finalize(&mut session).await.unwrap();
    assert_eq!(loop_svc.finalize(&mut session).await.unwrap(), id);

    let profile = repo.get_profile().await.unwrap().unwrap();
    assert_eq!(profile.star_total(), 3);
    assert_eq!(repo.list_summaries(None, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn app_services_wire_sound_settings_into_the_board() {
    let services = AppServices::in_memory(Clock::fixed(fixed_now()))
        .await
        .unwrap();
    assert!(!services.sound().settings().muted());
    services.sound_settings().toggle_mute().await.unwrap();
    assert!(services.sound().settings().muted());

    let profile = services.profiles().ensure_profile().await.unwrap();
    assert_eq!(profile.display_name(), "Dino Explorer");
    assert!(services.history().list_recent(None, 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn fresh_install_play_through_rewards_the_default_explorer() {
    let services = AppServices::in_memory(Clock::fixed(fixed_now()))
        .await
        .unwrap();
    assert!(services.profiles().overview().await.unwrap().is_none());

    let game_loop = services.game_loop();
    let mut session = services
        .start_game(GameType::Math, Tier::Beginner)
        .await
        .unwrap();
    let last = loop {
        let text = session.question().correct_answer_text();
        let outcome = game_loop
            .answer(&mut session, Answer::Selected(text))
            .await
            .unwrap();
        match outcome.continuation {
            Some(token) => game_loop.advance(&mut session, token).unwrap(),
            None => break outcome,
        }
    };
    assert_eq!(last.reward.unwrap().stars.value(), 3);

    let store = services.profiles().load().await.unwrap();
    let profile = store.profile().unwrap();
    assert_eq!(profile.display_name(), "Dino Explorer");
    assert_eq!(profile.star_total(), 3);
    assert_eq!(profile.high_score(GameType::Math), 100);
}

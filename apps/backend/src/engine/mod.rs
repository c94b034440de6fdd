//! Round engine: the single entry point that mutates round and game state.
//!
//! Every trigger (a player's message, a timer firing, the lobby starting a
//! game) arrives as a [`GameCommand`]. Each step runs in its own
//! transaction; notifications go out only after the commit, and timers are
//! armed from the committed deadlines.

pub mod command;
pub mod notify;
pub mod timers;

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use sea_orm::DatabaseConnection;
use time::OffsetDateTime;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

pub use command::{CommandOutcome, GameCommand};
pub use notify::{
    EndReason, GameEndReason, GameEvent, Notifier, NotifyTarget, PlayerPoints, SkipReason,
};
pub use timers::{ArmedTimer, RoundTimers, TimerKind};

use crate::config::game::GameRules;
use crate::db::txn::with_txn;
use crate::entities::rounds::RoundStatus;
use crate::error::AppError;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::errors::ErrorCode;
use crate::repos::decks::AnswerCard;
use crate::repos::players::{self, Player};
use crate::repos::{games, rounds};
use crate::services::games::{self as game_service, CreatedGame, GameSetup, GameSnapshot};
use crate::services::rounds::{self as round_service, RoundStart, VotingTransition};
use crate::services::{card_pool, win_evaluator};
use crate::utils::time::remaining;

/// Extra runs a timer command gets after transient failures.
const TIMER_RETRY_LIMIT: u32 = 5;

pub struct GameEngine {
    db: DatabaseConnection,
    rules: GameRules,
    notifier: Arc<dyn Notifier>,
    timers: RoundTimers,
}

impl GameEngine {
    pub fn new(db: DatabaseConnection, rules: GameRules, notifier: Arc<dyn Notifier>) -> Arc<Self> {
        Arc::new(Self {
            db,
            rules,
            notifier,
            timers: RoundTimers::new(),
        })
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn timers(&self) -> &RoundTimers {
        &self.timers
    }

    /// Run one command to completion.
    pub async fn dispatch(self: &Arc<Self>, cmd: GameCommand) -> Result<CommandOutcome, AppError> {
        debug!(command = cmd.name(), "Dispatching command");
        match cmd {
            GameCommand::StartGame { game_id } => self.start_game(game_id).await,
            GameCommand::SubmitPick {
                round_id,
                player_id,
                answer_card_ids,
            } => self.submit_pick(round_id, player_id, answer_card_ids).await,
            GameCommand::CastVote {
                judge_player_id,
                round_pick_id,
            } => self.cast_vote(judge_player_id, round_pick_id).await,
            GameCommand::PlayerLeft { player_id } => self.player_left(player_id).await,
            GameCommand::DrawingTimeout { game_id, round_id } => {
                self.end_round(game_id, round_id, EndReason::Timeout).await
            }
            GameCommand::VotingTimeout { game_id, round_id } => {
                self.voting_timeout(game_id, round_id).await
            }
            GameCommand::NextRound { game_id } => self.next_round(game_id).await,
        }
    }

    /// Persist a new game for the lobby layer. Call `StartGame` to open round 1.
    pub async fn create_game(&self, setup: GameSetup) -> Result<CreatedGame, AppError> {
        with_txn(&self.db, move |txn| {
            Box::pin(async move { game_service::create_game(txn, setup).await })
        })
        .await
    }

    pub async fn snapshot(&self, game_id: i64) -> Result<GameSnapshot, AppError> {
        game_service::load_snapshot(&self.db, game_id, self.rules.win_threshold).await
    }

    pub async fn hand(&self, player_id: i64) -> Result<Vec<AnswerCard>, AppError> {
        card_pool::hand_of(&self.db, player_id).await
    }

    /// Check that `player_id` plays in `game_id`.
    pub async fn authorize(&self, game_id: i64, player_id: i64) -> Result<Player, AppError> {
        let player = players::require_player(&self.db, player_id).await?;
        if player.game_id != game_id {
            return Err(AppError::unauthorized(
                ErrorCode::NotAMember,
                format!("player {player_id} does not play in game {game_id}"),
            ));
        }
        Ok(player)
    }

    /// Re-arm timers of every PLAYING game from persisted deadlines.
    ///
    /// Deadlines already in the past fire right away. Games whose latest
    /// round has ended (or that never opened one) get the cool-down.
    /// Returns how many games were recovered.
    pub async fn recover(self: &Arc<Self>) -> Result<usize, AppError> {
        let game_ids = games::find_playing_ids(&self.db).await?;

        for game_id in &game_ids {
            let game_id = *game_id;
            match rounds::find_latest_by_game(&self.db, game_id).await? {
                Some(round) if round.status == RoundStatus::DrawingCards => {
                    self.arm_drawing(game_id, round.id, round.ends_at);
                }
                Some(round) if round.status == RoundStatus::CzarVoting => {
                    let deadline = round.voting_ends_at.unwrap_or(round.ends_at);
                    self.arm_voting(game_id, round.id, deadline);
                }
                _ => self.schedule_next_round(game_id),
            }
        }

        info!(games = game_ids.len(), "Round timers recovered");
        Ok(game_ids.len())
    }

    async fn start_game(self: &Arc<Self>, game_id: i64) -> Result<CommandOutcome, AppError> {
        let rules = self.rules;
        let now = OffsetDateTime::now_utc();
        let started = with_txn(&self.db, move |txn| {
            Box::pin(async move {
                if rounds::find_latest_by_game(txn, game_id).await?.is_some() {
                    return Err(DomainError::validation(
                        ValidationKind::GameAlreadyStarted,
                        format!("game {game_id} already has rounds"),
                    )
                    .into());
                }
                round_service::create_round(txn, game_id, &rules, now).await
            })
        })
        .await;

        self.after_round_creation(game_id, started).await
    }

    async fn next_round(self: &Arc<Self>, game_id: i64) -> Result<CommandOutcome, AppError> {
        let rules = self.rules;
        let now = OffsetDateTime::now_utc();
        let started = with_txn(&self.db, move |txn| {
            Box::pin(async move { round_service::create_round(txn, game_id, &rules, now).await })
        })
        .await;

        match started {
            Err(err) if matches!(err.code(), ErrorCode::PhaseMismatch | ErrorCode::RoundInProgress) => {
                debug!(game_id, error = %err, "Next round not needed");
                Ok(CommandOutcome::Ignored)
            }
            other => self.after_round_creation(game_id, other).await,
        }
    }

    async fn after_round_creation(
        self: &Arc<Self>,
        game_id: i64,
        started: Result<RoundStart, AppError>,
    ) -> Result<CommandOutcome, AppError> {
        match started {
            Ok(start) => self.announce_round(start).await,
            Err(err) if err.code() == ErrorCode::PromptPoolExhausted => {
                warn!(game_id, "No prompts left, ending game");
                self.end_game_without_winner(game_id, GameEndReason::NoPromptsLeft)
                    .await
            }
            Err(err) if err.code() == ErrorCode::NotEnoughPlayers => {
                warn!(game_id, "Not enough active players, ending game");
                self.end_game_without_winner(game_id, GameEndReason::NotEnoughPlayers)
                    .await
            }
            Err(err) => Err(err),
        }
    }

    async fn announce_round(self: &Arc<Self>, start: RoundStart) -> Result<CommandOutcome, AppError> {
        let RoundStart { round, dealt, .. } = start;
        let game_id = round.game_id;

        self.arm_drawing(game_id, round.id, round.ends_at);

        let view = game_service::load_round_view(&self.db, round.id).await?;
        self.notifier
            .notify(NotifyTarget::Game(game_id), GameEvent::RoundStarted { round: view });

        for (player_id, new_card_ids) in dealt.by_player {
            let hand = card_pool::hand_of(&self.db, player_id).await?;
            self.notifier.notify(
                NotifyTarget::Player { game_id, player_id },
                GameEvent::HandDealt {
                    round_id: round.id,
                    new_card_ids,
                    hand,
                },
            );
        }

        Ok(CommandOutcome::RoundStarted {
            game_id,
            round_id: round.id,
            round_no: round.round_no,
        })
    }

    async fn submit_pick(
        self: &Arc<Self>,
        round_id: i64,
        player_id: i64,
        answer_card_ids: Vec<i64>,
    ) -> Result<CommandOutcome, AppError> {
        let (pick, round, status) = with_txn(&self.db, move |txn| {
            Box::pin(async move {
                let pick =
                    round_service::submit_pick(txn, round_id, player_id, &answer_card_ids).await?;
                let round = rounds::require_round(txn, round_id).await?;
                let status = round_service::submission_status(txn, &round).await?;
                Ok::<_, AppError>((pick, round, status))
            })
        })
        .await?;

        self.notifier.notify(
            NotifyTarget::Game(round.game_id),
            GameEvent::PickSubmitted {
                round_id,
                player_id,
                submitted: status.submitted.len(),
                expected: status.expected.len(),
            },
        );

        let voting_started = if status.is_complete() {
            !matches!(
                self.end_round(round.game_id, round_id, EndReason::AllPlayed)
                    .await?,
                CommandOutcome::Ignored
            )
        } else {
            false
        };

        Ok(CommandOutcome::PickAccepted {
            round_id,
            round_pick_id: pick.id,
            voting_started,
        })
    }

    /// Close drawing for a round. Only the first caller to find the round in
    /// DRAWING_CARDS does anything; later callers are ignored silently.
    ///
    /// The drawing timer is disarmed only once the transition committed, so a
    /// failed all-played close still leaves the deadline armed.
    async fn end_round(
        self: &Arc<Self>,
        game_id: i64,
        round_id: i64,
        reason: EndReason,
    ) -> Result<CommandOutcome, AppError> {
        let voting_duration = self.rules.voting_duration;
        let now = OffsetDateTime::now_utc();
        let transition = with_txn(&self.db, move |txn| {
            Box::pin(async move {
                round_service::transition_to_voting(txn, round_id, voting_duration, now).await
            })
        })
        .await?;
        self.timers.disarm(game_id, round_id, TimerKind::Drawing);

        let VotingTransition::Advanced { round, pick_count } = transition else {
            return Ok(CommandOutcome::Ignored);
        };

        let view = game_service::load_round_view(&self.db, round_id).await?;
        self.notifier.notify(
            NotifyTarget::Game(game_id),
            GameEvent::RoundEnded {
                reason,
                round: view,
            },
        );

        if pick_count == 0 {
            return self
                .close_round(game_id, round_id, SkipReason::NoPicks)
                .await;
        }

        let deadline = round.voting_ends_at.unwrap_or(now + voting_duration);
        self.arm_voting(game_id, round_id, deadline);
        Ok(CommandOutcome::VotingStarted { round_id })
    }

    async fn cast_vote(
        self: &Arc<Self>,
        judge_player_id: i64,
        round_pick_id: i64,
    ) -> Result<CommandOutcome, AppError> {
        let win_threshold = self.rules.win_threshold;
        let now = OffsetDateTime::now_utc();
        let (resolution, outcome) = with_txn(&self.db, move |txn| {
            Box::pin(async move {
                let resolution =
                    round_service::resolve(txn, round_pick_id, judge_player_id, now).await?;
                let outcome =
                    win_evaluator::evaluate(txn, resolution.game_id, win_threshold, now).await?;
                Ok::<_, AppError>((resolution, outcome))
            })
        })
        .await?;

        let game_id = resolution.game_id;
        self.timers
            .disarm(game_id, resolution.round_id, TimerKind::Voting);

        self.notifier.notify(
            NotifyTarget::Game(game_id),
            GameEvent::RoundResolved {
                round_id: resolution.round_id,
                round_no: resolution.round_no,
                round_pick_id,
                winner_player_id: resolution.winner_player_id,
                points: outcome
                    .tally()
                    .iter()
                    .map(|(player_id, points)| PlayerPoints {
                        player_id: *player_id,
                        points: *points,
                    })
                    .collect(),
            },
        );

        let game_winner_player_id = match outcome {
            win_evaluator::GameOutcome::Ended {
                winner_player_id, ..
            } => {
                self.announce_game_end(
                    game_id,
                    Some(winner_player_id),
                    GameEndReason::WinThreshold,
                );
                Some(winner_player_id)
            }
            win_evaluator::GameOutcome::Continue { .. } => {
                self.schedule_next_round(game_id);
                None
            }
        };

        Ok(CommandOutcome::RoundResolved {
            round_id: resolution.round_id,
            winner_player_id: resolution.winner_player_id,
            game_winner_player_id,
        })
    }

    async fn voting_timeout(
        self: &Arc<Self>,
        game_id: i64,
        round_id: i64,
    ) -> Result<CommandOutcome, AppError> {
        self.close_round(game_id, round_id, SkipReason::VotingTimeout)
            .await
    }

    /// End a voting round without a winner and move on after the cool-down.
    async fn close_round(
        self: &Arc<Self>,
        game_id: i64,
        round_id: i64,
        reason: SkipReason,
    ) -> Result<CommandOutcome, AppError> {
        let now = OffsetDateTime::now_utc();
        let closed = with_txn(&self.db, move |txn| {
            Box::pin(async move { round_service::close_without_winner(txn, round_id, now).await })
        })
        .await?;

        if !closed {
            return Ok(CommandOutcome::Ignored);
        }

        self.notifier.notify(
            NotifyTarget::Game(game_id),
            GameEvent::RoundSkipped { round_id, reason },
        );
        self.schedule_next_round(game_id);
        Ok(CommandOutcome::RoundClosed { round_id })
    }

    async fn player_left(self: &Arc<Self>, player_id: i64) -> Result<CommandOutcome, AppError> {
        let (player, pending) = with_txn(&self.db, move |txn| {
            Box::pin(async move {
                let player = game_service::set_player_active(txn, player_id, false).await?;
                let pending = match rounds::find_open_by_game(txn, player.game_id).await? {
                    Some(round) if round.status == RoundStatus::DrawingCards => {
                        let status = round_service::submission_status(txn, &round).await?;
                        Some((round, status))
                    }
                    _ => None,
                };
                Ok::<_, AppError>((player, pending))
            })
        })
        .await?;

        info!(game_id = player.game_id, player_id, "Player left");

        if let Some((round, status)) = pending {
            if status.is_complete() {
                self.end_round(player.game_id, round.id, EndReason::AllPlayed)
                    .await?;
            }
        }

        Ok(CommandOutcome::PlayerDeactivated { player_id })
    }

    async fn end_game_without_winner(
        self: &Arc<Self>,
        game_id: i64,
        reason: GameEndReason,
    ) -> Result<CommandOutcome, AppError> {
        let now = OffsetDateTime::now_utc();
        let ended = with_txn(&self.db, move |txn| {
            Box::pin(async move { game_service::end_without_winner(txn, game_id, now).await })
        })
        .await?;

        if ended {
            self.announce_game_end(game_id, None, reason);
        } else {
            self.timers.forget_game(game_id);
        }
        Ok(CommandOutcome::GameEnded {
            game_id,
            winner_player_id: None,
        })
    }

    fn announce_game_end(
        &self,
        game_id: i64,
        winner_player_id: Option<i64>,
        reason: GameEndReason,
    ) {
        self.timers.forget_game(game_id);
        self.notifier.notify(
            NotifyTarget::Game(game_id),
            GameEvent::GameEnded {
                winner_player_id,
                reason,
            },
        );
    }

    fn arm_drawing(self: &Arc<Self>, game_id: i64, round_id: i64, ends_at: OffsetDateTime) {
        self.arm_command(
            TimerSpec {
                game_id,
                round_id: Some(round_id),
                kind: TimerKind::Drawing,
                cmd: GameCommand::DrawingTimeout { game_id, round_id },
            },
            instant_at(ends_at),
            0,
        );
    }

    fn arm_voting(self: &Arc<Self>, game_id: i64, round_id: i64, voting_ends_at: OffsetDateTime) {
        self.arm_command(
            TimerSpec {
                game_id,
                round_id: Some(round_id),
                kind: TimerKind::Voting,
                cmd: GameCommand::VotingTimeout { game_id, round_id },
            },
            instant_at(voting_ends_at),
            0,
        );
    }

    fn schedule_next_round(self: &Arc<Self>, game_id: i64) {
        self.arm_command(
            TimerSpec {
                game_id,
                round_id: None,
                kind: TimerKind::Cooldown,
                cmd: GameCommand::NextRound { game_id },
            },
            Instant::now() + self.rules.cooldown,
            0,
        );
    }

    fn arm_command(self: &Arc<Self>, spec: TimerSpec, deadline: Instant, attempt: u32) {
        self.timers.arm(
            spec.game_id,
            spec.round_id,
            spec.kind,
            deadline,
            self.timer_task(spec, attempt),
        );
    }

    /// Work a timer runs when it fires. Failures cannot reach a caller:
    /// transient ones re-arm the same command after `timer_retry` (unless
    /// another timer took the slot meanwhile), the rest are logged and pushed
    /// to the game as an error event.
    fn timer_task(self: &Arc<Self>, spec: TimerSpec, attempt: u32) -> BoxFuture<'static, ()> {
        let engine = Arc::clone(self);
        async move {
            let game_id = spec.game_id;
            let command = spec.cmd.name();
            let Err(err) = engine.dispatch(spec.cmd.clone()).await else {
                return;
            };

            if err.is_transient()
                && attempt < TIMER_RETRY_LIMIT
                && engine.timers.armed(game_id).is_none()
            {
                warn!(game_id, command, attempt, error = %err, "Timer command failed, retrying");
                let retry_at = Instant::now() + engine.rules.timer_retry;
                engine.arm_command(spec, retry_at, attempt + 1);
                return;
            }

            error!(game_id, command, attempt, error = %err, "Timer command failed");
            engine.notifier.notify(
                NotifyTarget::Game(game_id),
                GameEvent::Error {
                    code: err.code().as_str().to_string(),
                    message: err.detail(),
                },
            );
        }
        .boxed()
    }
}

/// A timer's identity and the command it dispatches when it fires.
struct TimerSpec {
    game_id: i64,
    round_id: Option<i64>,
    kind: TimerKind,
    cmd: GameCommand,
}

fn instant_at(deadline: OffsetDateTime) -> Instant {
    Instant::now() + remaining(deadline, OffsetDateTime::now_utc())
}

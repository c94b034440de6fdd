use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::{GameCommand, GameEngine};
use crate::error::{AppError, ErrorKind};
use crate::errors::ErrorCode;
use crate::state::app_state::AppState;
use crate::ws::hub::{Push, SessionRegistry};
use crate::ws::protocol::{ClientMsg, ServerMsg, PROTOCOL_VERSION};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session = WsSession::new(
        Arc::clone(&app_state.engine),
        Arc::clone(&app_state.registry),
    );
    ws::start(session, &req, stream)
}

/// The player a connection speaks for, set by `join`.
#[derive(Debug, Clone, Copy)]
struct Membership {
    game_id: i64,
    player_id: i64,
    /// Registration key in the hub.
    hub_key: Uuid,
}

pub struct WsSession {
    conn_id: Uuid,
    engine: Arc<GameEngine>,
    registry: Arc<SessionRegistry>,
    membership: Option<Membership>,

    last_heartbeat: Instant,
    hello_done: bool,
}

impl WsSession {
    fn new(engine: Arc<GameEngine>, registry: Arc<SessionRegistry>) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            engine,
            registry,
            membership: None,
            last_heartbeat: Instant::now(),
            hello_done: false,
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn send_error_and_close(
        &self,
        ctx: &mut ws::WebsocketContext<Self>,
        code: ErrorCode,
        message: impl Into<String>,
    ) {
        Self::send_json(ctx, &ServerMsg::error(ErrorKind::BadRequest, code.as_str(), message));
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
        ctx.stop();
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(conn_id = %actor.conn_id, "[WS SESSION] heartbeat timed out");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    fn leave_game(&mut self) {
        if let Some(membership) = self.membership.take() {
            self.registry
                .unregister(membership.game_id, membership.hub_key);
        }
    }

    fn handle_join(&mut self, game_id: i64, player_id: i64, ctx: &mut ws::WebsocketContext<Self>) {
        let engine = Arc::clone(&self.engine);
        let conn_id = self.conn_id;

        ctx.spawn(
            async move {
                engine.authorize(game_id, player_id).await?;
                let game = engine.snapshot(game_id).await?;
                let hand = engine.hand(player_id).await?;
                Ok::<_, AppError>((game, hand))
            }
            .into_actor(self)
            .map(move |res, actor, ctx| match res {
                Ok((game, hand)) => {
                    actor.leave_game();
                    let hub_key =
                        actor
                            .registry
                            .register(game_id, player_id, ctx.address().recipient::<Push>());
                    actor.membership = Some(Membership {
                        game_id,
                        player_id,
                        hub_key,
                    });
                    info!(conn_id = %conn_id, game_id, player_id, "[WS SESSION] joined game");
                    Self::send_json(ctx, &ServerMsg::Joined { game, hand });
                }
                Err(err) => {
                    debug!(conn_id = %conn_id, game_id, player_id, error = %err, "[WS SESSION] join rejected");
                    Self::send_json(ctx, &ServerMsg::from(&err));
                }
            }),
        );
    }

    /// Run a player command through the engine and answer with an ack or a
    /// typed error frame. The socket stays open either way.
    fn run_command(
        &self,
        cmd: GameCommand,
        ack: &'static str,
        ctx: &mut ws::WebsocketContext<Self>,
    ) {
        let engine = Arc::clone(&self.engine);
        let conn_id = self.conn_id;
        let command = cmd.name();

        ctx.spawn(
            async move { engine.dispatch(cmd).await }
                .into_actor(self)
                .map(move |res, _actor, ctx| match res {
                    Ok(_) => Self::send_json(ctx, &ServerMsg::Ack { message: ack }),
                    Err(err) => {
                        if err.kind() == ErrorKind::Internal {
                            warn!(conn_id = %conn_id, command, error = %err, "[WS SESSION] command failed");
                        } else {
                            debug!(conn_id = %conn_id, command, error = %err, "[WS SESSION] command rejected");
                        }
                        Self::send_json(ctx, &ServerMsg::from(&err));
                    }
                }),
        );
    }

    fn require_membership(&self, ctx: &mut ws::WebsocketContext<Self>) -> Option<Membership> {
        if self.membership.is_none() {
            let err = AppError::unauthorized(ErrorCode::Unauthorized, "Must join a game first");
            Self::send_json(ctx, &ServerMsg::from(&err));
        }
        self.membership
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, "[WS SESSION] started");
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.leave_game();
        info!(conn_id = %self.conn_id, "[WS SESSION] stopped");
    }
}

impl Handler<Push> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: Push, ctx: &mut Self::Context) -> Self::Result {
        ctx.text(&*msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();

                let Ok(cmd) = serde_json::from_str::<ClientMsg>(&text) else {
                    self.send_error_and_close(ctx, ErrorCode::MalformedMessage, "Malformed JSON");
                    return;
                };

                if let ClientMsg::Hello { protocol } = cmd {
                    if protocol != PROTOCOL_VERSION {
                        self.send_error_and_close(
                            ctx,
                            ErrorCode::BadRequest,
                            "Unsupported protocol version",
                        );
                        return;
                    }
                    self.hello_done = true;
                    Self::send_json(
                        ctx,
                        &ServerMsg::HelloAck {
                            protocol: PROTOCOL_VERSION,
                        },
                    );
                    return;
                }

                if !self.hello_done {
                    self.send_error_and_close(ctx, ErrorCode::BadRequest, "Must send hello first");
                    return;
                }

                match cmd {
                    ClientMsg::Hello { .. } => {}
                    ClientMsg::Join { game_id, player_id } => {
                        self.handle_join(game_id, player_id, ctx);
                    }
                    ClientMsg::SubmitPick {
                        round_id,
                        answer_card_ids,
                    } => {
                        let Some(membership) = self.require_membership(ctx) else {
                            return;
                        };
                        self.run_command(
                            GameCommand::SubmitPick {
                                round_id,
                                player_id: membership.player_id,
                                answer_card_ids,
                            },
                            "pick_accepted",
                            ctx,
                        );
                    }
                    ClientMsg::CastVote { round_pick_id } => {
                        let Some(membership) = self.require_membership(ctx) else {
                            return;
                        };
                        self.run_command(
                            GameCommand::CastVote {
                                judge_player_id: membership.player_id,
                                round_pick_id,
                            },
                            "vote_accepted",
                            ctx,
                        );
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                self.send_error_and_close(ctx, ErrorCode::BadRequest, "Binary not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(conn_id = %self.conn_id, error = %err, "[WS SESSION] protocol error");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

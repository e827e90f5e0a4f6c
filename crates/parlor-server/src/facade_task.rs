//! Central facade task.
//!
//! This task owns the `MatchCoordinator` collaborator and processes
//! every `FacadeRequest` coming from session tasks and local sessions,
//! in arrival order. It is the facade implementation proper: parameter
//! validation, delegation to the collaborator, notification pushes —
//! and no game logic of its own.
//!
//! It is also the single place sessions are removed from the registry,
//! which is what makes removal (and the abort cascade behind it)
//! exactly-once.
//!
//! Domain rejections never travel as errors: the TypeTag vocabulary
//! has no error tag, so each operation maps failures to its neutral
//! reply (false, -1, empty list/snapshot, empty string) and the
//! rejection itself is logged here.

use parlor_core::{
    Call, Card, ChatMessage, MatchCoordinator, MatchError, MatchId, Notice, PhaseSnapshot, Reply,
    TableSnapshot,
};
use tracing::{debug, info, warn};

use crate::registry::Registry;
use crate::types::{FacadeRequest, FacadeRx, HangupCause, SessionId};

/// Run the central facade processing loop.
///
/// - `rx`: receives requests from all session tasks.
/// - `registry`: connected sessions and their notification sinks.
/// - `matches`: the game collaborator; owned exclusively by this task.
pub async fn run_facade_loop<M>(mut rx: FacadeRx, registry: Registry, mut matches: M)
where
    M: MatchCoordinator,
{
    while let Some(request) = rx.recv().await {
        match request {
            FacadeRequest::Call {
                session,
                call,
                reply,
            } => {
                // A call can race its own session's eviction; once the
                // record is gone the call must not touch any state.
                if !registry.contains(session).await {
                    debug!("call from unregistered session {}", session.0);
                    let _ = reply.send(Reply::None);
                    continue;
                }
                // Any traffic proves liveness, not just pongs.
                registry.touch(session).await;
                debug!("session {}: {:?}", session.0, call);
                let outcome = handle_call(&mut matches, &registry, session, call).await;
                let _ = reply.send(outcome);
            }
            FacadeRequest::Hangup { session, cause } => {
                drop_session(&mut matches, &registry, session, cause).await;
            }
        }
    }

    info!("facade loop shutting down (request channel closed)");
}

/// Dispatch one call. Pushes to co-players happen here, after the
/// collaborator has accepted the operation.
async fn handle_call<M>(
    matches: &mut M,
    registry: &Registry,
    session: SessionId,
    call: Call,
) -> Reply
where
    M: MatchCoordinator,
{
    match call {
        Call::CheckName { nickname } => Reply::Bool(matches.name_taken(&nickname)),

        Call::AddMatch { nickname } => {
            if nickname.trim().is_empty() {
                warn!("session {}: add match with empty nickname", session.0);
                return Reply::Int(-1);
            }
            if registry.nickname_of(session).await.is_some() {
                warn!("session {}: already joined; add match refused", session.0);
                return Reply::Int(-1);
            }
            match matches.create_match(&nickname) {
                Ok(match_id) => {
                    registry.bind(session, &nickname, match_id, true, true).await;
                    info!("{} opened match {}", nickname, match_id);
                    Reply::Int(match_id.0)
                }
                Err(e) => {
                    warn!("session {}: add match refused: {}", session.0, e);
                    Reply::Int(-1)
                }
            }
        }

        Call::AddPlayer { nickname, match_id } => {
            if nickname.trim().is_empty() {
                warn!("session {}: add player with empty nickname", session.0);
                return Reply::Bool(false);
            }
            if registry.nickname_of(session).await.is_some() {
                warn!("session {}: already joined; add player refused", session.0);
                return Reply::Bool(false);
            }
            match matches.join_match(match_id, &nickname) {
                Ok(()) => {
                    registry.bind(session, &nickname, match_id, false, false).await;
                    info!("{} joined match {}", nickname, match_id);
                    registry
                        .broadcast_match(
                            match_id,
                            Notice::Update(format!("{} joined the match", nickname)),
                        )
                        .await;
                    if matches.all_connected(match_id).unwrap_or(false) {
                        registry
                            .broadcast_match(
                                match_id,
                                Notice::Update("all seats taken: choose your pawn colors".into()),
                            )
                            .await;
                    }
                    Reply::Bool(true)
                }
                Err(e) => {
                    warn!("session {}: add player refused: {}", session.0, e);
                    Reply::Bool(false)
                }
            }
        }

        Call::ViewColors { match_id } => match matches.unclaimed_colors(match_id) {
            Ok(colors) => Reply::Colors(colors),
            Err(e) => {
                warn!("session {}: view colors: {}", session.0, e);
                Reply::Colors(Vec::new())
            }
        },

        Call::ChooseColor {
            nickname,
            match_id,
            color,
        } => match matches.claim_color(match_id, &nickname, color) {
            Ok(()) => {
                registry
                    .broadcast_match(
                        match_id,
                        Notice::Update(format!("{} took the {} pawn", nickname, color)),
                    )
                    .await;
                if matches.all_colors_chosen(match_id).unwrap_or(false) {
                    announce_turn(matches, registry, match_id).await;
                }
                Reply::Bool(true)
            }
            Err(e) => {
                warn!("session {}: choose color refused: {}", session.0, e);
                Reply::Bool(false)
            }
        },

        Call::ValidPositions { nickname, match_id } => {
            match matches.valid_positions(match_id, &nickname) {
                Ok(positions) => Reply::Positions(positions),
                Err(e) => {
                    warn!("session {}: valid positions: {}", session.0, e);
                    Reply::Positions(Vec::new())
                }
            }
        }

        Call::Place {
            nickname,
            match_id,
            hand_index,
            position,
            face,
        } => match matches.place_card(match_id, &nickname, hand_index, position, face) {
            Ok(()) => {
                registry
                    .broadcast_match(
                        match_id,
                        Notice::Update(format!("{} placed a card", nickname)),
                    )
                    .await;
                Reply::Bool(true)
            }
            Err(e) => {
                warn!("session {}: place refused: {}", session.0, e);
                Reply::Bool(false)
            }
        },

        Call::DrawResource { nickname, match_id } => {
            let drawn = matches.draw_resource(match_id, &nickname);
            after_draw(matches, registry, session, match_id, &nickname, drawn).await
        }

        Call::DrawGold { nickname, match_id } => {
            let drawn = matches.draw_gold(match_id, &nickname);
            after_draw(matches, registry, session, match_id, &nickname, drawn).await
        }

        Call::DrawTable {
            nickname,
            match_id,
            slot,
        } => {
            let drawn = matches.draw_from_table(match_id, &nickname, slot);
            after_draw(matches, registry, session, match_id, &nickname, drawn).await
        }

        Call::ViewHand { nickname, match_id } => match matches.hand(match_id, &nickname) {
            Ok(cards) => Reply::Cards(cards),
            Err(e) => {
                warn!("session {}: view hand: {}", session.0, e);
                Reply::Cards(Vec::new())
            }
        },

        Call::ViewTable { match_id } => match matches.table(match_id) {
            Ok(table) => Reply::Table(table),
            Err(e) => {
                warn!("session {}: view table: {}", session.0, e);
                Reply::Table(TableSnapshot::empty(match_id))
            }
        },

        Call::ViewNames { match_id } => match matches.player_names(match_id) {
            Ok(names) => Reply::Names(names),
            Err(e) => {
                warn!("session {}: view names: {}", session.0, e);
                Reply::Names(Vec::new())
            }
        },

        Call::ViewPhase { match_id } => match matches.phase(match_id) {
            Ok(phase) => Reply::Phase(phase),
            Err(e) => {
                warn!("session {}: view phase: {}", session.0, e);
                Reply::Phase(PhaseSnapshot::empty())
            }
        },

        Call::CheckTurn { nickname, match_id } => {
            Reply::Bool(matches.is_on_turn(match_id, &nickname).unwrap_or(false))
        }

        Call::IsLastRound { match_id } => {
            Reply::Bool(matches.is_last_round(match_id).unwrap_or(false))
        }

        Call::Score { nickname, match_id } => match matches.score(match_id, &nickname) {
            Ok(score) => Reply::Int(score),
            Err(e) => {
                warn!("session {}: score: {}", session.0, e);
                Reply::Int(-1)
            }
        },

        Call::Winner { match_id } => {
            Reply::Str(matches.winner(match_id).unwrap_or(None).unwrap_or_default())
        }

        Call::Chat {
            nickname,
            match_id,
            body,
        } => {
            if registry.match_of(session).await != Some(match_id) {
                warn!("session {}: chat outside own match", session.0);
                return Reply::None;
            }
            registry
                .broadcast_match(match_id, Notice::Chat(ChatMessage::new(nickname, body)))
                .await;
            Reply::None
        }

        Call::Whisper {
            nickname,
            recipient,
            match_id,
            body,
        } => {
            if registry.match_of(session).await != Some(match_id) {
                warn!("session {}: whisper outside own match", session.0);
                return Reply::None;
            }
            let delivered = registry
                .push_to_nickname(&recipient, Notice::PrivateChat(ChatMessage::new(nickname, body)))
                .await;
            if !delivered {
                warn!("session {}: whisper to unknown '{}'", session.0, recipient);
            }
            Reply::None
        }

        Call::CheatFullGold { nickname, match_id } => {
            match matches.grant_gold_hand(match_id, &nickname) {
                Ok(()) => {
                    registry
                        .broadcast_match(
                            match_id,
                            Notice::Update(format!("{} refilled their hand with gold", nickname)),
                        )
                        .await;
                }
                Err(e) => warn!("session {}: cheat 1 refused: {}", session.0, e),
            }
            Reply::None
        }

        Call::CheatPoints { nickname, match_id } => {
            match matches.grant_points(match_id, &nickname, 20) {
                Ok(()) => {
                    registry
                        .broadcast_match(
                            match_id,
                            Notice::Update(format!("{} was granted 20 points", nickname)),
                        )
                        .await;
                }
                Err(e) => warn!("session {}: cheat 2 refused: {}", session.0, e),
            }
            Reply::None
        }

        Call::CheatLastRound { nickname, match_id } => {
            match matches.force_last_round(match_id) {
                Ok(()) => {
                    registry
                        .broadcast_match(
                            match_id,
                            Notice::Update(format!("{} forced the last round", nickname)),
                        )
                        .await;
                }
                Err(e) => warn!("session {}: cheat 3 refused: {}", session.0, e),
            }
            Reply::None
        }

        // last-seen was already refreshed above, like for every call.
        Call::ReceivePong { .. } => Reply::None,

        Call::RemoveClient { nickname } => {
            debug!("session {} ({}) leaving", session.0, nickname);
            drop_session(matches, registry, session, HangupCause::Left).await;
            Reply::None
        }
    }
}

/// Shared tail of the three draw operations: the collaborator has
/// already advanced the turn, so announce whoever is next (or the
/// winner when the draw ended the match), then hand back the hand.
async fn after_draw<M>(
    matches: &mut M,
    registry: &Registry,
    session: SessionId,
    match_id: MatchId,
    nickname: &str,
    drawn: Result<Vec<Card>, MatchError>,
) -> Reply
where
    M: MatchCoordinator,
{
    match drawn {
        Ok(hand) => {
            registry
                .broadcast_match(match_id, Notice::Update(format!("{} drew a card", nickname)))
                .await;
            announce_turn(matches, registry, match_id).await;
            Reply::Cards(hand)
        }
        Err(e) => {
            warn!("session {}: draw refused: {}", session.0, e);
            Reply::Cards(matches.hand(match_id, nickname).unwrap_or_default())
        }
    }
}

/// Push TURN for the player now on turn, or the final standings when
/// the match just ended.
async fn announce_turn<M>(matches: &mut M, registry: &Registry, match_id: MatchId)
where
    M: MatchCoordinator,
{
    match matches.current_player(match_id) {
        Ok(Some(next)) => {
            registry.broadcast_match(match_id, Notice::Turn(next)).await;
        }
        Ok(None) => {
            if let Ok(Some(winner)) = matches.winner(match_id) {
                registry
                    .broadcast_match(
                        match_id,
                        Notice::Update(format!("match over: {} wins", winner)),
                    )
                    .await;
            }
        }
        Err(e) => debug!("turn announcement skipped: {}", e),
    }
}

/// Remove a session and abort its match for everyone else.
///
/// The abort fires only if the collaborator still had the match: the
/// first hangup drops the match state, so co-players' own teardowns
/// (triggered by the EXIT they just received) find nothing to abort
/// and each survivor sees exactly one EXIT.
async fn drop_session<M>(
    matches: &mut M,
    registry: &Registry,
    session: SessionId,
    cause: HangupCause,
) where
    M: MatchCoordinator,
{
    let Some(record) = registry.remove(session).await else {
        return;
    };
    record.notify_shutdown();

    let nickname = record
        .nickname
        .clone()
        .unwrap_or_else(|| format!("session {}", session.0));
    info!("{} removed: {}", nickname, cause.phrase());

    if let Some(match_id) = record.match_id {
        if matches.abort_match(match_id) {
            let reason = format!("{} {}; the match is aborted", nickname, cause.phrase());
            registry
                .broadcast_match(match_id, Notice::Exit(reason))
                .await;
        }
    }
}

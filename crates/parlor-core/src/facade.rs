//! The session facade: the shared contract of every operation a client
//! may invoke on the coordinator, independent of transport.
//!
//! Both transports implement [`CallTransport`] — a single method that
//! ships a [`Call`] and produces a [`Reply`] — and get the full typed
//! [`SessionFacade`] surface from the blanket impl below. That keeps
//! the operation-to-shape mapping in exactly one place.
//!
//! Usage invariant (not runtime-checked): on one session, calls must be
//! issued strictly sequentially. The protocol has no correlation IDs;
//! a caller that overlaps calls on the byte-stream transport risks
//! response misattribution.

use crate::card::{Card, CardFace};
use crate::color::PawnColor;
use crate::error::SessionError;
use crate::ids::MatchId;
use crate::messages::{Call, Reply};
use crate::position::Position;
use crate::snapshot::{PhaseSnapshot, TableSnapshot};

/// One-shot call/reply transport underneath the facade.
///
/// Errors are transport failures only; domain rejections come back as
/// normal replies (e.g. `Reply::Bool(false)`).
#[allow(async_fn_in_trait)]
pub trait CallTransport {
    async fn call(&self, call: Call) -> Result<Reply, SessionError>;
}

/// The typed operation surface of the coordinator.
///
/// Every method corresponds to exactly one wire verb and one response
/// shape; see `parlor-protocol` for the encoding.
#[allow(async_fn_in_trait)]
pub trait SessionFacade {
    /// True if the nickname is already registered with the coordinator.
    async fn check_name(&self, nickname: &str) -> Result<bool, SessionError>;

    /// Create a match and take its first seat. Returns the match id.
    async fn add_match(&self, nickname: &str) -> Result<MatchId, SessionError>;

    /// Join an existing match. False when the match is full, unknown,
    /// already playing, or the nickname is taken.
    async fn add_player(&self, nickname: &str, match_id: MatchId) -> Result<bool, SessionError>;

    async fn view_colors(&self, match_id: MatchId) -> Result<Vec<PawnColor>, SessionError>;

    async fn choose_color(
        &self,
        nickname: &str,
        match_id: MatchId,
        color: PawnColor,
    ) -> Result<bool, SessionError>;

    async fn valid_positions(
        &self,
        nickname: &str,
        match_id: MatchId,
    ) -> Result<Vec<Position>, SessionError>;

    /// Place a hand card. False when the placement is rejected.
    async fn place(
        &self,
        nickname: &str,
        match_id: MatchId,
        hand_index: usize,
        position: Position,
        face: CardFace,
    ) -> Result<bool, SessionError>;

    /// Draw from the resource deck; returns the hand after the draw.
    async fn draw_resource(
        &self,
        nickname: &str,
        match_id: MatchId,
    ) -> Result<Vec<Card>, SessionError>;

    /// Draw from the gold deck; returns the hand after the draw.
    async fn draw_gold(&self, nickname: &str, match_id: MatchId)
        -> Result<Vec<Card>, SessionError>;

    /// Draw a face-up table card; returns the hand after the draw.
    async fn draw_table(
        &self,
        nickname: &str,
        match_id: MatchId,
        slot: usize,
    ) -> Result<Vec<Card>, SessionError>;

    async fn view_hand(&self, nickname: &str, match_id: MatchId)
        -> Result<Vec<Card>, SessionError>;

    async fn view_table(&self, match_id: MatchId) -> Result<TableSnapshot, SessionError>;

    async fn view_names(&self, match_id: MatchId) -> Result<Vec<String>, SessionError>;

    async fn view_phase(&self, match_id: MatchId) -> Result<PhaseSnapshot, SessionError>;

    /// True if it is this player's turn.
    async fn check_turn(&self, nickname: &str, match_id: MatchId) -> Result<bool, SessionError>;

    async fn is_last_round(&self, match_id: MatchId) -> Result<bool, SessionError>;

    /// Current score; -1 for an unknown match or player.
    async fn score(&self, nickname: &str, match_id: MatchId) -> Result<i64, SessionError>;

    /// Winner's nickname once the match has ended, empty string before.
    async fn winner(&self, match_id: MatchId) -> Result<String, SessionError>;

    async fn chat(&self, nickname: &str, match_id: MatchId, body: &str)
        -> Result<(), SessionError>;

    async fn whisper(
        &self,
        nickname: &str,
        recipient: &str,
        match_id: MatchId,
        body: &str,
    ) -> Result<(), SessionError>;

    async fn cheat_full_gold(&self, nickname: &str, match_id: MatchId)
        -> Result<(), SessionError>;

    async fn cheat_points(&self, nickname: &str, match_id: MatchId) -> Result<(), SessionError>;

    async fn cheat_last_round(&self, nickname: &str, match_id: MatchId)
        -> Result<(), SessionError>;

    /// Answer a heartbeat ping.
    async fn receive_pong(&self, nickname: &str) -> Result<(), SessionError>;

    /// Leave the coordinator; aborts the caller's match for co-players.
    async fn remove_client(&self, nickname: &str) -> Result<(), SessionError>;
}

impl<T: CallTransport> SessionFacade for T {
    async fn check_name(&self, nickname: &str) -> Result<bool, SessionError> {
        self.call(Call::CheckName {
            nickname: nickname.into(),
        })
        .await?
        .into_bool()
    }

    async fn add_match(&self, nickname: &str) -> Result<MatchId, SessionError> {
        self.call(Call::AddMatch {
            nickname: nickname.into(),
        })
        .await?
        .into_int()
        .map(MatchId)
    }

    async fn add_player(&self, nickname: &str, match_id: MatchId) -> Result<bool, SessionError> {
        self.call(Call::AddPlayer {
            nickname: nickname.into(),
            match_id,
        })
        .await?
        .into_bool()
    }

    async fn view_colors(&self, match_id: MatchId) -> Result<Vec<PawnColor>, SessionError> {
        self.call(Call::ViewColors { match_id }).await?.into_colors()
    }

    async fn choose_color(
        &self,
        nickname: &str,
        match_id: MatchId,
        color: PawnColor,
    ) -> Result<bool, SessionError> {
        self.call(Call::ChooseColor {
            nickname: nickname.into(),
            match_id,
            color,
        })
        .await?
        .into_bool()
    }

    async fn valid_positions(
        &self,
        nickname: &str,
        match_id: MatchId,
    ) -> Result<Vec<Position>, SessionError> {
        self.call(Call::ValidPositions {
            nickname: nickname.into(),
            match_id,
        })
        .await?
        .into_positions()
    }

    async fn place(
        &self,
        nickname: &str,
        match_id: MatchId,
        hand_index: usize,
        position: Position,
        face: CardFace,
    ) -> Result<bool, SessionError> {
        self.call(Call::Place {
            nickname: nickname.into(),
            match_id,
            hand_index,
            position,
            face,
        })
        .await?
        .into_bool()
    }

    async fn draw_resource(
        &self,
        nickname: &str,
        match_id: MatchId,
    ) -> Result<Vec<Card>, SessionError> {
        self.call(Call::DrawResource {
            nickname: nickname.into(),
            match_id,
        })
        .await?
        .into_cards()
    }

    async fn draw_gold(
        &self,
        nickname: &str,
        match_id: MatchId,
    ) -> Result<Vec<Card>, SessionError> {
        self.call(Call::DrawGold {
            nickname: nickname.into(),
            match_id,
        })
        .await?
        .into_cards()
    }

    async fn draw_table(
        &self,
        nickname: &str,
        match_id: MatchId,
        slot: usize,
    ) -> Result<Vec<Card>, SessionError> {
        self.call(Call::DrawTable {
            nickname: nickname.into(),
            match_id,
            slot,
        })
        .await?
        .into_cards()
    }

    async fn view_hand(
        &self,
        nickname: &str,
        match_id: MatchId,
    ) -> Result<Vec<Card>, SessionError> {
        self.call(Call::ViewHand {
            nickname: nickname.into(),
            match_id,
        })
        .await?
        .into_cards()
    }

    async fn view_table(&self, match_id: MatchId) -> Result<TableSnapshot, SessionError> {
        self.call(Call::ViewTable { match_id }).await?.into_table()
    }

    async fn view_names(&self, match_id: MatchId) -> Result<Vec<String>, SessionError> {
        self.call(Call::ViewNames { match_id }).await?.into_names()
    }

    async fn view_phase(&self, match_id: MatchId) -> Result<PhaseSnapshot, SessionError> {
        self.call(Call::ViewPhase { match_id }).await?.into_phase()
    }

    async fn check_turn(&self, nickname: &str, match_id: MatchId) -> Result<bool, SessionError> {
        self.call(Call::CheckTurn {
            nickname: nickname.into(),
            match_id,
        })
        .await?
        .into_bool()
    }

    async fn is_last_round(&self, match_id: MatchId) -> Result<bool, SessionError> {
        self.call(Call::IsLastRound { match_id }).await?.into_bool()
    }

    async fn score(&self, nickname: &str, match_id: MatchId) -> Result<i64, SessionError> {
        self.call(Call::Score {
            nickname: nickname.into(),
            match_id,
        })
        .await?
        .into_int()
    }

    async fn winner(&self, match_id: MatchId) -> Result<String, SessionError> {
        self.call(Call::Winner { match_id }).await?.into_str()
    }

    async fn chat(
        &self,
        nickname: &str,
        match_id: MatchId,
        body: &str,
    ) -> Result<(), SessionError> {
        self.call(Call::Chat {
            nickname: nickname.into(),
            match_id,
            body: body.into(),
        })
        .await?
        .into_void()
    }

    async fn whisper(
        &self,
        nickname: &str,
        recipient: &str,
        match_id: MatchId,
        body: &str,
    ) -> Result<(), SessionError> {
        self.call(Call::Whisper {
            nickname: nickname.into(),
            recipient: recipient.into(),
            match_id,
            body: body.into(),
        })
        .await?
        .into_void()
    }

    async fn cheat_full_gold(
        &self,
        nickname: &str,
        match_id: MatchId,
    ) -> Result<(), SessionError> {
        self.call(Call::CheatFullGold {
            nickname: nickname.into(),
            match_id,
        })
        .await?
        .into_void()
    }

    async fn cheat_points(&self, nickname: &str, match_id: MatchId) -> Result<(), SessionError> {
        self.call(Call::CheatPoints {
            nickname: nickname.into(),
            match_id,
        })
        .await?
        .into_void()
    }

    async fn cheat_last_round(
        &self,
        nickname: &str,
        match_id: MatchId,
    ) -> Result<(), SessionError> {
        self.call(Call::CheatLastRound {
            nickname: nickname.into(),
            match_id,
        })
        .await?
        .into_void()
    }

    async fn receive_pong(&self, nickname: &str) -> Result<(), SessionError> {
        self.call(Call::ReceivePong {
            nickname: nickname.into(),
        })
        .await?
        .into_void()
    }

    async fn remove_client(&self, nickname: &str) -> Result<(), SessionError> {
        self.call(Call::RemoveClient {
            nickname: nickname.into(),
        })
        .await?
        .into_void()
    }
}

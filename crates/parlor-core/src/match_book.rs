//! The match coordinator collaborator.
//!
//! [`MatchCoordinator`] is the seam between the protocol layer and the
//! game: every operation is a synchronous call keyed by match id and
//! nickname. The protocol layer treats these as opaque.
//!
//! [`MatchBook`] is the in-memory implementation used by the server
//! binary and the test suites. Its rules are deliberately small — just
//! enough state to drive the protocol end-to-end:
//!
//! - fixed match capacity; the creator is first-to-join and holds the
//!   black pawn; play starts once the match is full and every seat has
//!   claimed a color
//! - deterministic decks (no shuffling): 40 resource cards alternating
//!   0/1 points, 40 gold cards cycling 1..=3 points; each seat gets a
//!   starter card auto-placed at (0,0) and a dealt hand of three
//! - a turn is place-then-draw; placements cover a free diagonal corner
//!   of the player's area; face-down placements score zero; any draw
//!   completes the turn
//! - the last round arms when a score reaches 20 or both decks run out;
//!   the match ends when the turn wraps back to the first seat

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::card::{Card, CardFace, CardKind, PlacedCard};
use crate::color::PawnColor;
use crate::error::MatchError;
use crate::ids::MatchId;
use crate::position::Position;
use crate::snapshot::{MatchPhase, PhaseSnapshot, SeatView, TableSnapshot};

/// Score that arms the last round.
pub const WINNING_SCORE: i64 = 20;

/// Cards dealt to a fresh hand: two resource, one gold.
pub const HAND_SIZE: usize = 3;

/// Operations the protocol layer invokes on the game, keyed by match id
/// and nickname. All calls are synchronous and infallible at the
/// transport level; domain rejections come back as [`MatchError`].
pub trait MatchCoordinator {
    fn name_taken(&self, nickname: &str) -> bool;
    fn create_match(&mut self, nickname: &str) -> Result<MatchId, MatchError>;
    fn join_match(&mut self, match_id: MatchId, nickname: &str) -> Result<(), MatchError>;
    fn unclaimed_colors(&self, match_id: MatchId) -> Result<Vec<PawnColor>, MatchError>;
    fn claim_color(
        &mut self,
        match_id: MatchId,
        nickname: &str,
        color: PawnColor,
    ) -> Result<(), MatchError>;
    fn valid_positions(
        &self,
        match_id: MatchId,
        nickname: &str,
    ) -> Result<Vec<Position>, MatchError>;
    fn place_card(
        &mut self,
        match_id: MatchId,
        nickname: &str,
        hand_index: usize,
        position: Position,
        face: CardFace,
    ) -> Result<(), MatchError>;
    /// Draw from the resource deck; returns the hand after the draw.
    fn draw_resource(&mut self, match_id: MatchId, nickname: &str)
        -> Result<Vec<Card>, MatchError>;
    /// Draw from the gold deck; returns the hand after the draw.
    fn draw_gold(&mut self, match_id: MatchId, nickname: &str) -> Result<Vec<Card>, MatchError>;
    /// Draw a face-up table card; returns the hand after the draw.
    fn draw_from_table(
        &mut self,
        match_id: MatchId,
        nickname: &str,
        slot: usize,
    ) -> Result<Vec<Card>, MatchError>;
    fn hand(&self, match_id: MatchId, nickname: &str) -> Result<Vec<Card>, MatchError>;
    fn table(&self, match_id: MatchId) -> Result<TableSnapshot, MatchError>;
    fn player_names(&self, match_id: MatchId) -> Result<Vec<String>, MatchError>;
    fn phase(&self, match_id: MatchId) -> Result<PhaseSnapshot, MatchError>;
    fn is_on_turn(&self, match_id: MatchId, nickname: &str) -> Result<bool, MatchError>;
    fn current_player(&self, match_id: MatchId) -> Result<Option<String>, MatchError>;
    fn is_last_round(&self, match_id: MatchId) -> Result<bool, MatchError>;
    fn score(&self, match_id: MatchId, nickname: &str) -> Result<i64, MatchError>;
    /// Winner's nickname once the match has ended.
    fn winner(&self, match_id: MatchId) -> Result<Option<String>, MatchError>;

    // Lifecycle predicates.
    fn all_connected(&self, match_id: MatchId) -> Result<bool, MatchError>;
    fn all_colors_chosen(&self, match_id: MatchId) -> Result<bool, MatchError>;
    fn all_starters_placed(&self, match_id: MatchId) -> Result<bool, MatchError>;

    // Debug hooks behind the cheat verbs.
    fn grant_gold_hand(&mut self, match_id: MatchId, nickname: &str) -> Result<(), MatchError>;
    fn grant_points(
        &mut self,
        match_id: MatchId,
        nickname: &str,
        points: i64,
    ) -> Result<(), MatchError>;
    fn force_last_round(&mut self, match_id: MatchId) -> Result<(), MatchError>;

    /// Drop all state for a match. True if the match existed. Dropping
    /// twice is a no-op, which is what keeps abort cascades from
    /// re-firing.
    fn abort_match(&mut self, match_id: MatchId) -> bool;
    fn contains(&self, match_id: MatchId) -> bool;
}

/// In-memory multi-match coordinator.
pub struct MatchBook {
    capacity: usize,
    next_id: i64,
    matches: HashMap<MatchId, MatchState>,
}

struct Seat {
    nickname: String,
    color: Option<PawnColor>,
    black_pawn: bool,
    hand: Vec<Card>,
    area: Vec<PlacedCard>,
    score: i64,
}

struct MatchState {
    id: MatchId,
    capacity: usize,
    seats: Vec<Seat>,
    phase: MatchPhase,
    /// Seat index of the player on turn. Meaningful only while playing.
    current: usize,
    round: u32,
    last_round: bool,
    placed_this_turn: bool,
    resource_deck: Vec<Card>,
    gold_deck: Vec<Card>,
    /// Four table slots: 0-1 refill from the resource deck, 2-3 from gold.
    face_up: Vec<Option<Card>>,
}

impl MatchBook {
    /// `capacity` is the seat count every match is created with
    /// (clamped to at least 2).
    pub fn new(capacity: usize) -> Self {
        MatchBook {
            capacity: capacity.max(2),
            next_id: 1,
            matches: HashMap::new(),
        }
    }

    fn state(&self, match_id: MatchId) -> Result<&MatchState, MatchError> {
        self.matches
            .get(&match_id)
            .ok_or(MatchError::UnknownMatch(match_id))
    }

    fn state_mut(&mut self, match_id: MatchId) -> Result<&mut MatchState, MatchError> {
        self.matches
            .get_mut(&match_id)
            .ok_or(MatchError::UnknownMatch(match_id))
    }
}

impl MatchState {
    fn new(id: MatchId, capacity: usize) -> Self {
        let mut resource_deck: Vec<Card> = (1..=40)
            .map(|id| Card {
                id,
                kind: CardKind::Resource,
                points: (id % 2) as u8,
            })
            .collect();
        let mut gold_deck: Vec<Card> = (101..=140)
            .map(|id| Card {
                id,
                kind: CardKind::Gold,
                points: (1 + id % 3) as u8,
            })
            .collect();

        let face_up = vec![
            resource_deck.pop(),
            resource_deck.pop(),
            gold_deck.pop(),
            gold_deck.pop(),
        ];

        MatchState {
            id,
            capacity,
            seats: Vec::new(),
            phase: MatchPhase::WaitingForPlayers,
            current: 0,
            round: 0,
            last_round: false,
            placed_this_turn: false,
            resource_deck,
            gold_deck,
            face_up,
        }
    }

    /// Seat a player: starter card at (0,0), fresh three-card hand.
    fn seat(&mut self, nickname: &str) {
        let index = self.seats.len();
        let starter = Card {
            id: 900 + index as u32,
            kind: CardKind::Starter,
            points: 0,
        };

        let mut hand = Vec::with_capacity(HAND_SIZE);
        for _ in 0..2 {
            if let Some(c) = self.resource_deck.pop() {
                hand.push(c);
            }
        }
        if let Some(c) = self.gold_deck.pop() {
            hand.push(c);
        }

        self.seats.push(Seat {
            nickname: nickname.to_string(),
            color: None,
            black_pawn: index == 0,
            hand,
            area: vec![PlacedCard {
                card: starter,
                position: Position::new(0, 0),
                face: CardFace::Front,
            }],
            score: 0,
        });

        if self.seats.len() == self.capacity {
            self.phase = MatchPhase::ChoosingColors;
        }
    }

    fn seat_index(&self, nickname: &str) -> Result<usize, MatchError> {
        self.seats
            .iter()
            .position(|s| s.nickname == nickname)
            .ok_or_else(|| MatchError::UnknownPlayer(nickname.to_string()))
    }

    fn placeable(&self, seat_index: usize) -> BTreeSet<(i32, i32)> {
        let seat = &self.seats[seat_index];
        let occupied: HashSet<(i32, i32)> = seat
            .area
            .iter()
            .map(|p| (p.position.row, p.position.col))
            .collect();

        let mut open = BTreeSet::new();
        for placed in &seat.area {
            for corner in placed.position.corners() {
                if !occupied.contains(&(corner.row, corner.col)) {
                    open.insert((corner.row, corner.col));
                }
            }
        }
        open
    }

    /// Turn/phase gate shared by placement and every draw.
    fn require_turn(&self, nickname: &str) -> Result<usize, MatchError> {
        let index = self.seat_index(nickname)?;
        if self.phase != MatchPhase::Playing {
            return Err(MatchError::WrongPhase);
        }
        if index != self.current {
            return Err(MatchError::NotYourTurn);
        }
        Ok(index)
    }

    /// Advance to the next seat after a completed place-and-draw turn.
    fn finish_turn(&mut self) {
        self.placed_this_turn = false;
        if self.resource_deck.is_empty() && self.gold_deck.is_empty() {
            self.last_round = true;
        }
        self.current = (self.current + 1) % self.seats.len();
        if self.current == 0 {
            // The round closes when play wraps back to the black pawn.
            self.round += 1;
            if self.last_round {
                self.phase = MatchPhase::Ended;
            }
        }
    }

    fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            match_id: self.id,
            face_up: self.face_up.iter().flatten().copied().collect(),
            resource_deck: self.resource_deck.len(),
            gold_deck: self.gold_deck.len(),
            seats: self
                .seats
                .iter()
                .map(|s| SeatView {
                    nickname: s.nickname.clone(),
                    color: s.color,
                    black_pawn: s.black_pawn,
                    score: s.score,
                    placed: s.area.clone(),
                })
                .collect(),
        }
    }
}

impl MatchCoordinator for MatchBook {
    fn name_taken(&self, nickname: &str) -> bool {
        self.matches
            .values()
            .any(|m| m.seats.iter().any(|s| s.nickname == nickname))
    }

    fn create_match(&mut self, nickname: &str) -> Result<MatchId, MatchError> {
        if self.name_taken(nickname) {
            return Err(MatchError::NicknameTaken(nickname.to_string()));
        }
        let id = MatchId(self.next_id);
        self.next_id += 1;

        let mut state = MatchState::new(id, self.capacity);
        state.seat(nickname);
        self.matches.insert(id, state);
        Ok(id)
    }

    fn join_match(&mut self, match_id: MatchId, nickname: &str) -> Result<(), MatchError> {
        if self.name_taken(nickname) {
            return Err(MatchError::NicknameTaken(nickname.to_string()));
        }
        let state = self.state_mut(match_id)?;
        if state.phase != MatchPhase::WaitingForPlayers {
            return Err(MatchError::WrongPhase);
        }
        if state.seats.len() >= state.capacity {
            return Err(MatchError::MatchFull);
        }
        state.seat(nickname);
        Ok(())
    }

    fn unclaimed_colors(&self, match_id: MatchId) -> Result<Vec<PawnColor>, MatchError> {
        let state = self.state(match_id)?;
        let claimed: Vec<PawnColor> = state.seats.iter().filter_map(|s| s.color).collect();
        Ok(PawnColor::CLAIMABLE
            .iter()
            .copied()
            .filter(|c| !claimed.contains(c))
            .collect())
    }

    fn claim_color(
        &mut self,
        match_id: MatchId,
        nickname: &str,
        color: PawnColor,
    ) -> Result<(), MatchError> {
        let state = self.state_mut(match_id)?;
        if state.phase != MatchPhase::ChoosingColors {
            return Err(MatchError::WrongPhase);
        }
        let index = state.seat_index(nickname)?;
        if state.seats[index].color.is_some() {
            return Err(MatchError::AlreadyChosen);
        }
        if !PawnColor::CLAIMABLE.contains(&color)
            || state.seats.iter().any(|s| s.color == Some(color))
        {
            return Err(MatchError::ColorTaken(color));
        }
        state.seats[index].color = Some(color);

        if state.seats.iter().all(|s| s.color.is_some()) {
            state.phase = MatchPhase::Playing;
            state.current = 0;
            state.round = 1;
        }
        Ok(())
    }

    fn valid_positions(
        &self,
        match_id: MatchId,
        nickname: &str,
    ) -> Result<Vec<Position>, MatchError> {
        let state = self.state(match_id)?;
        let index = state.seat_index(nickname)?;
        Ok(state
            .placeable(index)
            .into_iter()
            .map(|(row, col)| Position::new(row, col))
            .collect())
    }

    fn place_card(
        &mut self,
        match_id: MatchId,
        nickname: &str,
        hand_index: usize,
        position: Position,
        face: CardFace,
    ) -> Result<(), MatchError> {
        let state = self.state_mut(match_id)?;
        let index = state.require_turn(nickname)?;
        if state.placed_this_turn {
            return Err(MatchError::AlreadyPlaced);
        }
        if hand_index >= state.seats[index].hand.len() {
            return Err(MatchError::BadHandIndex(hand_index));
        }
        if !state.placeable(index).contains(&(position.row, position.col)) {
            return Err(MatchError::BadPosition(position));
        }

        let seat = &mut state.seats[index];
        let card = seat.hand.remove(hand_index);
        seat.area.push(PlacedCard {
            card,
            position,
            face,
        });
        if face == CardFace::Front {
            seat.score += i64::from(card.points);
        }
        if seat.score >= WINNING_SCORE {
            state.last_round = true;
        }
        state.placed_this_turn = true;
        Ok(())
    }

    fn draw_resource(
        &mut self,
        match_id: MatchId,
        nickname: &str,
    ) -> Result<Vec<Card>, MatchError> {
        let state = self.state_mut(match_id)?;
        let index = state.require_turn(nickname)?;
        if !state.placed_this_turn {
            return Err(MatchError::MustPlaceFirst);
        }
        let card = state.resource_deck.pop().ok_or(MatchError::EmptyDeck)?;
        state.seats[index].hand.push(card);
        state.finish_turn();
        Ok(state.seats[index].hand.clone())
    }

    fn draw_gold(&mut self, match_id: MatchId, nickname: &str) -> Result<Vec<Card>, MatchError> {
        let state = self.state_mut(match_id)?;
        let index = state.require_turn(nickname)?;
        if !state.placed_this_turn {
            return Err(MatchError::MustPlaceFirst);
        }
        let card = state.gold_deck.pop().ok_or(MatchError::EmptyDeck)?;
        state.seats[index].hand.push(card);
        state.finish_turn();
        Ok(state.seats[index].hand.clone())
    }

    fn draw_from_table(
        &mut self,
        match_id: MatchId,
        nickname: &str,
        slot: usize,
    ) -> Result<Vec<Card>, MatchError> {
        let state = self.state_mut(match_id)?;
        let index = state.require_turn(nickname)?;
        if !state.placed_this_turn {
            return Err(MatchError::MustPlaceFirst);
        }
        let card = match state.face_up.get_mut(slot) {
            Some(slot_card) => slot_card.take().ok_or(MatchError::BadSlot(slot))?,
            None => return Err(MatchError::BadSlot(slot)),
        };
        // Refill the slot from its source deck; the slot may stay empty.
        let refill = if slot < 2 {
            state.resource_deck.pop()
        } else {
            state.gold_deck.pop()
        };
        state.face_up[slot] = refill;

        state.seats[index].hand.push(card);
        state.finish_turn();
        Ok(state.seats[index].hand.clone())
    }

    fn hand(&self, match_id: MatchId, nickname: &str) -> Result<Vec<Card>, MatchError> {
        let state = self.state(match_id)?;
        let index = state.seat_index(nickname)?;
        Ok(state.seats[index].hand.clone())
    }

    fn table(&self, match_id: MatchId) -> Result<TableSnapshot, MatchError> {
        Ok(self.state(match_id)?.snapshot())
    }

    fn player_names(&self, match_id: MatchId) -> Result<Vec<String>, MatchError> {
        Ok(self
            .state(match_id)?
            .seats
            .iter()
            .map(|s| s.nickname.clone())
            .collect())
    }

    fn phase(&self, match_id: MatchId) -> Result<PhaseSnapshot, MatchError> {
        let state = self.state(match_id)?;
        Ok(PhaseSnapshot {
            phase: state.phase,
            current_player: if state.phase == MatchPhase::Playing {
                Some(state.seats[state.current].nickname.clone())
            } else {
                None
            },
            round: state.round,
            last_round: state.last_round,
        })
    }

    fn is_on_turn(&self, match_id: MatchId, nickname: &str) -> Result<bool, MatchError> {
        let state = self.state(match_id)?;
        let index = state.seat_index(nickname)?;
        Ok(state.phase == MatchPhase::Playing && index == state.current)
    }

    fn current_player(&self, match_id: MatchId) -> Result<Option<String>, MatchError> {
        let state = self.state(match_id)?;
        Ok(if state.phase == MatchPhase::Playing {
            Some(state.seats[state.current].nickname.clone())
        } else {
            None
        })
    }

    fn is_last_round(&self, match_id: MatchId) -> Result<bool, MatchError> {
        Ok(self.state(match_id)?.last_round)
    }

    fn score(&self, match_id: MatchId, nickname: &str) -> Result<i64, MatchError> {
        let state = self.state(match_id)?;
        let index = state.seat_index(nickname)?;
        Ok(state.seats[index].score)
    }

    fn winner(&self, match_id: MatchId) -> Result<Option<String>, MatchError> {
        let state = self.state(match_id)?;
        if state.phase != MatchPhase::Ended {
            return Ok(None);
        }
        Ok(state
            .seats
            .iter()
            .max_by_key(|s| s.score)
            .map(|s| s.nickname.clone()))
    }

    fn all_connected(&self, match_id: MatchId) -> Result<bool, MatchError> {
        let state = self.state(match_id)?;
        Ok(state.seats.len() == state.capacity)
    }

    fn all_colors_chosen(&self, match_id: MatchId) -> Result<bool, MatchError> {
        let state = self.state(match_id)?;
        Ok(state.seats.len() == state.capacity && state.seats.iter().all(|s| s.color.is_some()))
    }

    fn all_starters_placed(&self, match_id: MatchId) -> Result<bool, MatchError> {
        let state = self.state(match_id)?;
        Ok(!state.seats.is_empty() && state.seats.iter().all(|s| !s.area.is_empty()))
    }

    fn grant_gold_hand(&mut self, match_id: MatchId, nickname: &str) -> Result<(), MatchError> {
        let state = self.state_mut(match_id)?;
        let index = state.seat_index(nickname)?;
        let mut drawn = Vec::with_capacity(HAND_SIZE);
        for _ in 0..HAND_SIZE {
            if let Some(c) = state.gold_deck.pop() {
                drawn.push(c);
            }
        }
        state.seats[index].hand = drawn;
        Ok(())
    }

    fn grant_points(
        &mut self,
        match_id: MatchId,
        nickname: &str,
        points: i64,
    ) -> Result<(), MatchError> {
        let state = self.state_mut(match_id)?;
        let index = state.seat_index(nickname)?;
        state.seats[index].score += points;
        if state.seats[index].score >= WINNING_SCORE {
            state.last_round = true;
        }
        Ok(())
    }

    fn force_last_round(&mut self, match_id: MatchId) -> Result<(), MatchError> {
        self.state_mut(match_id)?.last_round = true;
        Ok(())
    }

    fn abort_match(&mut self, match_id: MatchId) -> bool {
        self.matches.remove(&match_id).is_some()
    }

    fn contains(&self, match_id: MatchId) -> bool {
        self.matches.contains_key(&match_id)
    }
}

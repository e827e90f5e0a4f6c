//! The closed call vocabulary.
//!
//! Each verb is a stable textual operation name with a fixed argument
//! count. An unrecognized verb line is a protocol error the dispatch
//! loop logs and discards — it never terminates the connection.

use parlor_core::Call;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    CheckName,
    AddMatch,
    AddPlayer,
    ViewColors,
    ChooseColor,
    ValidPositions,
    Place,
    DrawResource,
    DrawGold,
    DrawTable,
    ViewHand,
    ViewTable,
    ViewNames,
    ViewPhase,
    CheckTurn,
    IsLastRound,
    Score,
    Winner,
    Chat,
    Whisper,
    Cheat1,
    Cheat2,
    Cheat3,
    ReceivePong,
    RemoveClient,
}

impl Verb {
    pub const ALL: [Verb; 25] = [
        Verb::CheckName,
        Verb::AddMatch,
        Verb::AddPlayer,
        Verb::ViewColors,
        Verb::ChooseColor,
        Verb::ValidPositions,
        Verb::Place,
        Verb::DrawResource,
        Verb::DrawGold,
        Verb::DrawTable,
        Verb::ViewHand,
        Verb::ViewTable,
        Verb::ViewNames,
        Verb::ViewPhase,
        Verb::CheckTurn,
        Verb::IsLastRound,
        Verb::Score,
        Verb::Winner,
        Verb::Chat,
        Verb::Whisper,
        Verb::Cheat1,
        Verb::Cheat2,
        Verb::Cheat3,
        Verb::ReceivePong,
        Verb::RemoveClient,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::CheckName => "check name",
            Verb::AddMatch => "add match",
            Verb::AddPlayer => "add player",
            Verb::ViewColors => "view colors",
            Verb::ChooseColor => "choose color",
            Verb::ValidPositions => "valid positions",
            Verb::Place => "place",
            Verb::DrawResource => "draw resource",
            Verb::DrawGold => "draw gold",
            Verb::DrawTable => "draw table",
            Verb::ViewHand => "view hand",
            Verb::ViewTable => "view table",
            Verb::ViewNames => "view names",
            Verb::ViewPhase => "view phase",
            Verb::CheckTurn => "check turn",
            Verb::IsLastRound => "is last round",
            Verb::Score => "score",
            Verb::Winner => "winner",
            Verb::Chat => "chat",
            Verb::Whisper => "whisper",
            Verb::Cheat1 => "cheat 1",
            Verb::Cheat2 => "cheat 2",
            Verb::Cheat3 => "cheat 3",
            Verb::ReceivePong => "receive pong",
            Verb::RemoveClient => "remove client",
        }
    }

    /// Parse a verb line. Returns `None` outside the vocabulary.
    pub fn parse(s: &str) -> Option<Verb> {
        match s {
            "check name" => Some(Verb::CheckName),
            "add match" => Some(Verb::AddMatch),
            "add player" => Some(Verb::AddPlayer),
            "view colors" => Some(Verb::ViewColors),
            "choose color" => Some(Verb::ChooseColor),
            "valid positions" => Some(Verb::ValidPositions),
            "place" => Some(Verb::Place),
            "draw resource" => Some(Verb::DrawResource),
            "draw gold" => Some(Verb::DrawGold),
            "draw table" => Some(Verb::DrawTable),
            "view hand" => Some(Verb::ViewHand),
            "view table" => Some(Verb::ViewTable),
            "view names" => Some(Verb::ViewNames),
            "view phase" => Some(Verb::ViewPhase),
            "check turn" => Some(Verb::CheckTurn),
            "is last round" => Some(Verb::IsLastRound),
            "score" => Some(Verb::Score),
            "winner" => Some(Verb::Winner),
            "chat" => Some(Verb::Chat),
            "whisper" => Some(Verb::Whisper),
            "cheat 1" => Some(Verb::Cheat1),
            "cheat 2" => Some(Verb::Cheat2),
            "cheat 3" => Some(Verb::Cheat3),
            "receive pong" => Some(Verb::ReceivePong),
            "remove client" => Some(Verb::RemoveClient),
            _ => None,
        }
    }

    /// Fixed number of argument lines following the verb line.
    pub fn arg_count(&self) -> usize {
        match self {
            Verb::CheckName | Verb::AddMatch | Verb::ReceivePong | Verb::RemoveClient => 1,
            Verb::AddPlayer
            | Verb::ValidPositions
            | Verb::DrawResource
            | Verb::DrawGold
            | Verb::ViewHand
            | Verb::CheckTurn
            | Verb::Score
            | Verb::Cheat1
            | Verb::Cheat2
            | Verb::Cheat3 => 2,
            Verb::ViewColors
            | Verb::ViewTable
            | Verb::ViewNames
            | Verb::ViewPhase
            | Verb::IsLastRound
            | Verb::Winner => 1,
            Verb::ChooseColor | Verb::DrawTable | Verb::Chat => 3,
            Verb::Whisper => 4,
            Verb::Place => 6,
        }
    }

    /// The verb a logical call travels under.
    pub fn of(call: &Call) -> Verb {
        match call {
            Call::CheckName { .. } => Verb::CheckName,
            Call::AddMatch { .. } => Verb::AddMatch,
            Call::AddPlayer { .. } => Verb::AddPlayer,
            Call::ViewColors { .. } => Verb::ViewColors,
            Call::ChooseColor { .. } => Verb::ChooseColor,
            Call::ValidPositions { .. } => Verb::ValidPositions,
            Call::Place { .. } => Verb::Place,
            Call::DrawResource { .. } => Verb::DrawResource,
            Call::DrawGold { .. } => Verb::DrawGold,
            Call::DrawTable { .. } => Verb::DrawTable,
            Call::ViewHand { .. } => Verb::ViewHand,
            Call::ViewTable { .. } => Verb::ViewTable,
            Call::ViewNames { .. } => Verb::ViewNames,
            Call::ViewPhase { .. } => Verb::ViewPhase,
            Call::CheckTurn { .. } => Verb::CheckTurn,
            Call::IsLastRound { .. } => Verb::IsLastRound,
            Call::Score { .. } => Verb::Score,
            Call::Winner { .. } => Verb::Winner,
            Call::Chat { .. } => Verb::Chat,
            Call::Whisper { .. } => Verb::Whisper,
            Call::CheatFullGold { .. } => Verb::Cheat1,
            Call::CheatPoints { .. } => Verb::Cheat2,
            Call::CheatLastRound { .. } => Verb::Cheat3,
            Call::ReceivePong { .. } => Verb::ReceivePong,
            Call::RemoveClient { .. } => Verb::RemoveClient,
        }
    }
}

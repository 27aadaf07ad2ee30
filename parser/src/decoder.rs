use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumString};

use crate::error::DecodeError;
use crate::types::{PlayerId, Vec3};

/// Score columns only exist in newer logs; this stands in when they are absent.
pub const SCORE_UNTRACKED: f64 = -1.0;

/// The kind tag at the start of every event line.
///
/// Parsing is driven by the strum string map, so registering a new kind is a
/// variant plus its tag. Tags nobody registered collect into `Unknown` with
/// the raw string preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, EnumString)]
pub enum EventKind {
    #[strum(serialize = "LOGIN")]
    Login,
    #[strum(serialize = "LOGOUT")]
    Logout,
    /// `DMG` and `DAMAGE` are synonyms; older collector builds wrote the long form.
    #[strum(serialize = "DMG", serialize = "DAMAGE")]
    Damage,
    #[strum(serialize = "KILL")]
    Kill,
    #[strum(serialize = "SPAWN")]
    Spawn,
    #[strum(serialize = "ROUNDEND")]
    RoundEnd,
    #[strum(serialize = "MATCHWON")]
    MatchWon,
    #[strum(default)]
    Unknown(String),
}

impl EventKind {
    pub fn from_tag(tag: &str) -> EventKind {
        EventKind::from_str(tag).unwrap_or_else(|_| EventKind::Unknown(tag.to_string()))
    }

    /// Token count of this kind's full, timestamped layout (tag and relative
    /// timestamp included).
    pub(crate) fn full_layout(&self) -> usize {
        match self {
            EventKind::Login | EventKind::Logout => 5,
            EventKind::Damage => 11,
            EventKind::Kill => 14,
            EventKind::Spawn => 8,
            EventKind::RoundEnd => 3,
            EventKind::MatchWon => 5,
            EventKind::Unknown(_) => 2,
        }
    }

    /// Early-format lines for these kinds were written without the relative
    /// timestamp token; see the fallback rule in [`crate::convert::Converter`].
    pub(crate) fn timestamp_optional(&self) -> bool {
        matches!(self, EventKind::RoundEnd | EventKind::MatchWon)
    }
}

/// How a match was won, decoded from the integer the server logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinCondition {
    AllObjectivesCaptured,
    ScoreLimit,
    TimeLimit,
    ReinforcementsDepleted,
    Lockdown,
    AllEnemiesEliminated,
    SuddenDeath,
    Elimination,
    MostPoints,
    Attrition,
    Surrender,
    Forfeit,
    Draw,
    MatchEndWonCampaign,
    MatchEndWonTerritory,
    MatchEndWonSupremacy,
    MatchEndWonSkirmish,
}

impl WinCondition {
    /// An out-of-range value is an error, not a silent default: the output is
    /// consumed by scoring tools that must not misattribute a win.
    pub fn from_raw(raw: i32) -> Result<WinCondition, DecodeError> {
        Ok(match raw {
            0 => WinCondition::AllObjectivesCaptured,
            1 => WinCondition::ScoreLimit,
            2 => WinCondition::TimeLimit,
            3 => WinCondition::ReinforcementsDepleted,
            4 => WinCondition::Lockdown,
            5 => WinCondition::AllEnemiesEliminated,
            6 => WinCondition::SuddenDeath,
            7 => WinCondition::Elimination,
            8 => WinCondition::MostPoints,
            9 => WinCondition::Attrition,
            10 => WinCondition::Surrender,
            11 => WinCondition::Forfeit,
            12 => WinCondition::Draw,
            13 => WinCondition::MatchEndWonCampaign,
            14 => WinCondition::MatchEndWonTerritory,
            15 => WinCondition::MatchEndWonSupremacy,
            16 => WinCondition::MatchEndWonSkirmish,
            raw => return Err(DecodeError::UnknownWinCondition(raw)),
        })
    }
}

/// Fields present on every decoded event regardless of kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBase {
    /// The raw kind tag exactly as logged (`DMG` stays `DMG`, `DAMAGE` stays
    /// `DAMAGE`).
    pub event_type: String,
    /// Absolute wall-clock time: header epoch + the line's relative seconds.
    pub datetime: NaiveDateTime,
}

/// A player connected to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginEvent {
    #[serde(flatten)]
    pub base: EventBase,
    pub player_id: PlayerId,
    pub name: String,
}

/// A player disconnected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoutEvent {
    #[serde(flatten)]
    pub base: EventBase,
    pub player_id: PlayerId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KillEvent {
    #[serde(flatten)]
    pub base: EventBase,
    pub killer_id: PlayerId,
    pub killed_id: PlayerId,
    pub killer_team_index: i32,
    pub killed_team_index: i32,
    pub hit_location: Vec3,
    pub hit_momentum: Vec3,
    pub damage_type: String,
    /// Skeletal bone name the killing hit landed on.
    pub hit_bone: String,
    pub hit_bone_index: i32,
    pub last_damaged_from_location: Vec3,
    /// [`SCORE_UNTRACKED`] when the log predates score tracking.
    pub killer_score: f64,
    /// [`SCORE_UNTRACKED`] when the log predates score tracking.
    pub killer_match_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageEvent {
    #[serde(flatten)]
    pub base: EventBase,
    pub damage: i32,
    pub injured_id: PlayerId,
    pub instigated_by_id: PlayerId,
    pub hit_location: Vec3,
    pub hit_momentum: Vec3,
    pub damage_type: String,
    /// The actor/projectile class that caused the damage.
    pub damage_causer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnEvent {
    #[serde(flatten)]
    pub base: EventBase,
    pub player_id: PlayerId,
    pub name: String,
    pub location: Vec3,
    pub team_index: i32,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundEndEvent {
    #[serde(flatten)]
    pub base: EventBase,
    pub winning_team: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchWonEvent {
    #[serde(flatten)]
    pub base: EventBase,
    pub winning_team: i32,
    pub win_condition: WinCondition,
    /// Team that won the final round of the match.
    pub round_winning_team: i32,
}

/// One decoded stats line: a variant per kind, each carrying only its own
/// fields, with the base fields embedded.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Login(LoginEvent),
    Logout(LogoutEvent),
    Kill(KillEvent),
    Damage(DamageEvent),
    Spawn(SpawnEvent),
    RoundEnd(RoundEndEvent),
    MatchWon(MatchWonEvent),
    /// A tag this version does not understand: base fields only.
    Other(EventBase),
}

impl GameEvent {
    pub fn base(&self) -> &EventBase {
        match self {
            GameEvent::Login(e) => &e.base,
            GameEvent::Logout(e) => &e.base,
            GameEvent::Kill(e) => &e.base,
            GameEvent::Damage(e) => &e.base,
            GameEvent::Spawn(e) => &e.base,
            GameEvent::RoundEnd(e) => &e.base,
            GameEvent::MatchWon(e) => &e.base,
            GameEvent::Other(base) => base,
        }
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.base().datetime
    }
}

/// Routes a tokenized line to the decoder for its kind. `shift` is 1 when the
/// relative-timestamp token was absent (early-format ROUNDEND/MATCHWON lines),
/// which moves every later field one position left. Unregistered kinds fall
/// through to a bare base event.
pub(crate) fn decode(
    kind: &EventKind,
    base: EventBase,
    tokens: &[String],
    shift: usize,
) -> Result<GameEvent, DecodeError> {
    match kind {
        EventKind::Login => decode_login(base, tokens).map(GameEvent::Login),
        EventKind::Logout => decode_logout(base, tokens).map(GameEvent::Logout),
        EventKind::Kill => decode_kill(base, tokens).map(GameEvent::Kill),
        EventKind::Damage => decode_damage(base, tokens).map(GameEvent::Damage),
        EventKind::Spawn => decode_spawn(base, tokens).map(GameEvent::Spawn),
        EventKind::RoundEnd => decode_round_end(base, tokens, shift).map(GameEvent::RoundEnd),
        EventKind::MatchWon => decode_match_won(base, tokens, shift).map(GameEvent::MatchWon),
        EventKind::Unknown(_) => Ok(GameEvent::Other(base)),
    }
}

fn decode_login(base: EventBase, tokens: &[String]) -> Result<LoginEvent, DecodeError> {
    require(tokens, 5)?;
    Ok(LoginEvent {
        base,
        player_id: PlayerId::from_tokens(&tokens[2], &tokens[3])?,
        name: tokens[4].clone(),
    })
}

fn decode_logout(base: EventBase, tokens: &[String]) -> Result<LogoutEvent, DecodeError> {
    require(tokens, 5)?;
    Ok(LogoutEvent {
        base,
        player_id: PlayerId::from_tokens(&tokens[2], &tokens[3])?,
        name: tokens[4].clone(),
    })
}

fn decode_kill(base: EventBase, tokens: &[String]) -> Result<KillEvent, DecodeError> {
    require(tokens, 14)?;
    Ok(KillEvent {
        base,
        killer_id: PlayerId::from_tokens(&tokens[2], &tokens[3])?,
        killed_id: PlayerId::from_tokens(&tokens[4], &tokens[5])?,
        killer_team_index: parse_num(&tokens[6])?,
        killed_team_index: parse_num(&tokens[7])?,
        hit_location: tokens[8].parse()?,
        hit_momentum: tokens[9].parse()?,
        damage_type: tokens[10].clone(),
        hit_bone: tokens[11].clone(),
        hit_bone_index: parse_num(&tokens[12])?,
        last_damaged_from_location: tokens[13].parse()?,
        killer_score: optional_score(tokens, 14)?,
        killer_match_score: optional_score(tokens, 15)?,
    })
}

fn decode_damage(base: EventBase, tokens: &[String]) -> Result<DamageEvent, DecodeError> {
    require(tokens, 11)?;
    Ok(DamageEvent {
        base,
        damage: parse_num(&tokens[2])?,
        injured_id: PlayerId::from_tokens(&tokens[3], &tokens[4])?,
        instigated_by_id: PlayerId::from_tokens(&tokens[5], &tokens[6])?,
        hit_location: tokens[7].parse()?,
        hit_momentum: tokens[8].parse()?,
        damage_type: tokens[9].clone(),
        damage_causer: tokens[10].clone(),
    })
}

fn decode_spawn(base: EventBase, tokens: &[String]) -> Result<SpawnEvent, DecodeError> {
    require(tokens, 8)?;
    Ok(SpawnEvent {
        base,
        player_id: PlayerId::from_tokens(&tokens[2], &tokens[3])?,
        name: tokens[4].clone(),
        location: tokens[5].parse()?,
        team_index: parse_num(&tokens[6])?,
        role: tokens[7].clone(),
    })
}

fn decode_round_end(
    base: EventBase,
    tokens: &[String],
    shift: usize,
) -> Result<RoundEndEvent, DecodeError> {
    require(tokens, 3 - shift)?;
    Ok(RoundEndEvent {
        base,
        winning_team: parse_num(&tokens[2 - shift])?,
    })
}

fn decode_match_won(
    base: EventBase,
    tokens: &[String],
    shift: usize,
) -> Result<MatchWonEvent, DecodeError> {
    require(tokens, 5 - shift)?;
    Ok(MatchWonEvent {
        base,
        winning_team: parse_num(&tokens[2 - shift])?,
        win_condition: WinCondition::from_raw(parse_num(&tokens[3 - shift])?)?,
        round_winning_team: parse_num(&tokens[4 - shift])?,
    })
}

fn require(tokens: &[String], expected: usize) -> Result<(), DecodeError> {
    if tokens.len() < expected {
        return Err(DecodeError::TruncatedLine {
            expected,
            found: tokens.len(),
        });
    }
    Ok(())
}

fn parse_num<T: FromStr>(token: &str) -> Result<T, DecodeError> {
    token.parse().map_err(|_| DecodeError::MalformedNumber {
        token: token.to_string(),
    })
}

fn optional_score(tokens: &[String], position: usize) -> Result<f64, DecodeError> {
    match tokens.get(position) {
        Some(token) => parse_num(token),
        None => Ok(SCORE_UNTRACKED),
    }
}

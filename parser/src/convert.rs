use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::decoder::{
    self, DamageEvent, EventBase, EventKind, GameEvent, KillEvent, LoginEvent, LogoutEvent,
    MatchWonEvent, RoundEndEvent, SpawnEvent,
};
use crate::error::{DecodeError, Error, SkippedLine};
use crate::header::Header;
use crate::tokenizer::tokenize;

/// Per-run line dispatcher.
///
/// Holds the epoch and the rolling "last computed timestamp" used by the
/// early-format fallback, so state never leaks between conversions of
/// different files: one `Converter` per run.
pub struct Converter {
    header: Header,
    last_datetime: chrono::NaiveDateTime,
}

impl Converter {
    pub fn new(header: Header) -> Converter {
        let last_datetime = header.epoch();
        Converter {
            header,
            last_datetime,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Decodes one event line (never the header line).
    ///
    /// Token 0 is the kind tag, token 1 the relative timestamp in seconds.
    /// ROUNDEND/MATCHWON lines from early collector builds omit the timestamp
    /// token; such an event is assumed to occur one millisecond after the
    /// previous one, and its remaining fields shift one position left.
    pub fn decode_line(&mut self, line: &str) -> Result<GameEvent, DecodeError> {
        let tokens = tokenize(line)?;
        if tokens.len() < 2 {
            return Err(DecodeError::TruncatedLine {
                expected: 2,
                found: tokens.len(),
            });
        }
        tracing::debug!(?tokens, "tokenized stats line");

        let kind = EventKind::from_tag(&tokens[0]);
        let (datetime, shift) = if kind.timestamp_optional() && tokens.len() < kind.full_layout() {
            (self.last_datetime + Duration::milliseconds(1), 1)
        } else {
            (self.header.epoch() + relative_offset(&tokens[1])?, 0)
        };
        self.last_datetime = datetime;

        let base = EventBase {
            event_type: tokens[0].clone(),
            datetime,
        };
        decoder::decode(&kind, base, &tokens, shift)
    }

    fn into_header(self) -> Header {
        self.header
    }
}

fn relative_offset(token: &str) -> Result<Duration, DecodeError> {
    let seconds: f64 = token.parse().map_err(|_| DecodeError::MalformedNumber {
        token: token.to_string(),
    })?;
    if !seconds.is_finite() {
        return Err(DecodeError::MalformedNumber {
            token: token.to_string(),
        });
    }
    Ok(Duration::microseconds((seconds * 1_000_000.0).round() as i64))
}

/// Decoded events grouped by kind. Within a kind, insertion order is input
/// line order. `DMG` and `DAMAGE` lines share one collection; each record's
/// `event_type` still carries the tag it was logged with.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    #[serde(rename = "LOGIN", default)]
    pub logins: Vec<LoginEvent>,
    #[serde(rename = "LOGOUT", default)]
    pub logouts: Vec<LogoutEvent>,
    #[serde(rename = "KILL", default)]
    pub kills: Vec<KillEvent>,
    #[serde(rename = "DMG", default)]
    pub damage: Vec<DamageEvent>,
    #[serde(rename = "SPAWN", default)]
    pub spawns: Vec<SpawnEvent>,
    #[serde(rename = "ROUNDEND", default)]
    pub round_ends: Vec<RoundEndEvent>,
    #[serde(rename = "MATCHWON", default)]
    pub matches_won: Vec<MatchWonEvent>,
    /// Base-only records from tags this version does not understand. Kept
    /// rather than dropped so no input line vanishes silently.
    #[serde(rename = "OTHER", default, skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<EventBase>,
}

impl EventLog {
    pub fn push(&mut self, event: GameEvent) {
        match event {
            GameEvent::Login(e) => self.logins.push(e),
            GameEvent::Logout(e) => self.logouts.push(e),
            GameEvent::Kill(e) => self.kills.push(e),
            GameEvent::Damage(e) => self.damage.push(e),
            GameEvent::Spawn(e) => self.spawns.push(e),
            GameEvent::RoundEnd(e) => self.round_ends.push(e),
            GameEvent::MatchWon(e) => self.matches_won.push(e),
            GameEvent::Other(base) => self.other.push(base),
        }
    }

    pub fn len(&self) -> usize {
        self.logins.len()
            + self.logouts.len()
            + self.kills.len()
            + self.damage.len()
            + self.spawns.len()
            + self.round_ends.len()
            + self.matches_won.len()
            + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The final aggregated output: the session header plus every decoded event,
/// grouped by kind. Built once per conversion and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub header: Header,
    pub events: EventLog,
}

/// Outcome of one conversion run: the document plus every line that had to be
/// skipped, with enough context for the caller to report them.
#[derive(Debug)]
pub struct Conversion {
    pub document: Document,
    pub skipped: Vec<SkippedLine>,
}

/// Converts a whole log, supplied as an iterator of lines (header first).
///
/// A malformed header aborts: without an epoch nothing downstream can be
/// timestamped. Anything wrong with a single event line skips that line and
/// keeps the rest — a long session log with one corrupt line still yields a
/// document. Blank lines are ignored.
pub fn convert_lines<I>(lines: I) -> Result<Conversion, Error>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut lines = lines.into_iter();
    let header_line = lines.next().ok_or(Error::MalformedHeader {
        reason: "empty input".to_string(),
    })?;
    let mut converter = Converter::new(Header::parse(header_line.as_ref())?);

    let mut events = EventLog::default();
    let mut skipped = Vec::new();
    for (index, line) in lines.enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        match converter.decode_line(line) {
            Ok(event) => events.push(event),
            Err(error) => {
                // Header is line 1; the first event line is line 2.
                let line_number = index + 2;
                tracing::warn!(line_number, decode_error = %error, "skipping undecodable stats line");
                skipped.push(SkippedLine {
                    line_number,
                    raw: line.to_string(),
                    error,
                });
            }
        }
    }

    Ok(Conversion {
        document: Document {
            header: converter.into_header(),
            events,
        },
        skipped,
    })
}

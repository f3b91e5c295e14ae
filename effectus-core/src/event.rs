//! The immutable logging event produced by every `log` call, and its JSON
//! wire encoding for the HTTP sink and the log post-processor.

use crate::effectuation::Effectuation;
use crate::message::{Language, Localized, MessageId};
use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Opaque, caller-supplied information about the work item being
/// processed. The concrete shape of item info is an external concern (§1);
/// the core only carries it as an already-rendered string.
pub type ItemInfo = String;

/// Opaque, caller-supplied information about the work item's position
/// within a larger batch (e.g. "item 4 of 10").
pub type ItemPositionInfo = String;

/// A monotonic timestamp for a [`LoggingEvent`].
///
/// `nanos_since_start` is the value used for ordering within one process
/// (monotonic, per the spec's invariant); `wall_clock` is carried purely
/// for human- and machine-readable display and is not used for ordering.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    pub nanos_since_start: u128,
    wall_clock_unix_nanos: u128,
}

impl Timestamp {
    pub fn new(nanos_since_start: u128, wall_clock: SystemTime) -> Self {
        let wall_clock_unix_nanos = wall_clock
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_nanos();
        Timestamp {
            nanos_since_start,
            wall_clock_unix_nanos,
        }
    }

    /// The wall-clock instant this timestamp corresponds to.
    pub fn wall_clock(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_nanos(self.wall_clock_unix_nanos.min(u64::MAX as u128) as u64)
    }
}

/// An immutable record produced per `log` call.
///
/// Invariants (spec §3): `execution_level == effectuation_stack.len()` at
/// emit time; `timestamp` is monotonic within one process; the stack is a
/// by-value snapshot, never aliased with the live supervisor stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggingEvent {
    pub message_id: Option<MessageId>,
    pub severity: Severity,
    pub execution_level: usize,
    pub process_id: Option<u32>,
    pub application_name: String,
    pub fact: Localized,
    pub solution: Option<Localized>,
    pub item_info: Option<ItemInfo>,
    pub item_position_info: Option<ItemPositionInfo>,
    pub effectuation_stack: Vec<Effectuation>,
    pub timestamp: Timestamp,
}

impl LoggingEvent {
    /// Returns a copy of this event with `severity` replaced. Used by
    /// appease rewriting, which must never mutate the original event (the
    /// crash logger still needs the un-rewritten severity).
    pub fn with_severity(&self, severity: Severity) -> LoggingEvent {
        LoggingEvent {
            severity,
            ..self.clone()
        }
    }

    /// Returns a copy of this event with every language variant of `fact`
    /// (and `solution`, if present) prefixed by `prefix`. Used by the
    /// prefix logger.
    pub fn with_prefix(&self, prefix: &str) -> LoggingEvent {
        LoggingEvent {
            fact: self.fact.prefixed(prefix),
            solution: self.solution.as_ref().map(|s| s.prefixed(prefix)),
            ..self.clone()
        }
    }
}

#[derive(Serialize, Deserialize)]
struct LocalizedJson {
    en: Option<String>,
    de: Option<String>,
    fr: Option<String>,
}

impl From<&Localized> for LocalizedJson {
    fn from(l: &Localized) -> Self {
        LocalizedJson {
            en: l.get(Language::En).map(str::to_string),
            de: l.get(Language::De).map(str::to_string),
            fr: l.get(Language::Fr).map(str::to_string),
        }
    }
}

impl From<LocalizedJson> for Localized {
    fn from(j: LocalizedJson) -> Self {
        let mut out = Localized::new();
        if let Some(t) = j.en {
            out.set(Language::En, t);
        }
        if let Some(t) = j.de {
            out.set(Language::De, t);
        }
        if let Some(t) = j.fr {
            out.set(Language::Fr, t);
        }
        out
    }
}

/// The wire shape of a [`LoggingEvent`], matching the field names in §6:
/// `messageID, type, processID, applicationName, itemInfo,
/// itemPositionInfo, effectuationIDStack, time`, plus nested `fact`/
/// `solution` objects that always carry all three language slots (`null`
/// when absent).
#[derive(Serialize, Deserialize)]
struct EventJson {
    #[serde(rename = "messageID")]
    message_id: Option<MessageId>,
    #[serde(rename = "type")]
    severity: Severity,
    #[serde(rename = "processID")]
    process_id: Option<u32>,
    application_name: String,
    fact: LocalizedJson,
    solution: Option<LocalizedJson>,
    item_info: Option<ItemInfo>,
    item_position_info: Option<ItemPositionInfo>,
    #[serde(rename = "effectuationIDStack")]
    effectuation_id_stack: Vec<String>,
    time: Timestamp,
    execution_level: usize,
}

impl LoggingEvent {
    /// Serialize to the JSON wire format used by the HTTP sink and the log
    /// post-processor.
    pub fn to_json(&self) -> Result<String, crate::error::Error> {
        let wire = EventJson {
            message_id: self.message_id.clone(),
            severity: self.severity,
            process_id: self.process_id,
            application_name: self.application_name.clone(),
            fact: (&self.fact).into(),
            solution: self.solution.as_ref().map(Into::into),
            item_info: self.item_info.clone(),
            item_position_info: self.item_position_info.clone(),
            effectuation_id_stack: self.effectuation_stack.iter().map(Effectuation::encode).collect(),
            time: self.timestamp,
            execution_level: self.execution_level,
        };
        Ok(serde_json::to_string(&wire)?)
    }

    /// Deserialize from the JSON wire format. The effectuation stack is
    /// reconstructed by decoding each canonical text entry; an entry that
    /// fails to decode is an error, since the post-processor and the crash
    /// log must agree on what ran.
    pub fn from_json(text: &str) -> Result<LoggingEvent, crate::error::Error> {
        let wire: EventJson = serde_json::from_str(text)?;
        let effectuation_stack = wire
            .effectuation_id_stack
            .iter()
            .map(|s| {
                Effectuation::decode(s).ok_or_else(|| crate::error::Error::InvalidEffectuation(s.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LoggingEvent {
            message_id: wire.message_id,
            severity: wire.severity,
            execution_level: wire.execution_level,
            process_id: wire.process_id,
            application_name: wire.application_name,
            fact: wire.fact.into(),
            solution: wire.solution.map(Into::into),
            item_info: wire.item_info,
            item_position_info: wire.item_position_info,
            effectuation_stack,
            timestamp: wire.time,
        })
    }
}

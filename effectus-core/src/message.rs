//! Localized, parameterized diagnostic messages.
//!
//! A [`Message`] pairs a [`Severity`](crate::severity::Severity) with a
//! [`Localized`] fact and an optional [`Localized`] solution. Both may
//! contain positional placeholders (`$1`, `$2`, …) substituted at emit time
//! by [`crate::util::substitute`].

use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The closed set of supported languages, in the stable iteration order
/// used whenever a catalog is written out.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    De,
    Fr,
}

impl Language {
    /// The three supported languages, in their stable iteration order.
    pub const ALL: [Language; 3] = [Language::En, Language::De, Language::Fr];
}

/// A piece of text available in zero or more of the supported languages.
///
/// `en` is conventionally required by callers that build a [`Message`], but
/// this type itself does not enforce that: it is a plain language-to-text
/// map over the closed [`Language`] set.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Localized {
    texts: HashMap<Language, String>,
}

impl Localized {
    /// An empty localized text.
    pub fn new() -> Self {
        Localized {
            texts: HashMap::new(),
        }
    }

    /// Build from an English string only (the common case for
    /// framework-internal progress messages, see §6 of the spec).
    pub fn en(text: impl Into<String>) -> Self {
        let mut texts = HashMap::new();
        texts.insert(Language::En, text.into());
        Localized { texts }
    }

    /// Build from explicit per-language strings; absent languages are left
    /// unset.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Language, String)>) -> Self {
        Localized {
            texts: pairs.into_iter().collect(),
        }
    }

    /// The text for `language`, if present.
    pub fn get(&self, language: Language) -> Option<&str> {
        self.texts.get(&language).map(String::as_str)
    }

    /// Set (or replace) the text for `language`.
    pub fn set(&mut self, language: Language, text: impl Into<String>) {
        self.texts.insert(language, text.into());
    }

    /// Every language slot this text is defined for, in `en, de, fr` order.
    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        Language::ALL.into_iter().filter(move |l| self.texts.contains_key(l))
    }

    /// Substitute `$1..$N` placeholders in every present language variant
    /// with `args`, returning a new [`Localized`]. See
    /// [`crate::util::substitute`] for placeholder semantics.
    pub fn substituted(&self, args: &[&str]) -> Localized {
        let mut out = Localized::new();
        for lang in Language::ALL {
            if let Some(text) = self.get(lang) {
                out.set(lang, crate::util::substitute(text, args));
            }
        }
        out
    }

    /// Prepend `prefix` to every present language variant (used by the
    /// prefix logger).
    pub fn prefixed(&self, prefix: &str) -> Localized {
        let mut out = Localized::new();
        for lang in Language::ALL {
            if let Some(text) = self.get(lang) {
                out.set(lang, format!("{prefix}{text}"));
            }
        }
        out
    }
}

/// An optional identifier for a [`Message`], used by external tooling to
/// correlate emitted events back to their catalog entry.
pub type MessageId = String;

/// An immutable diagnostic message: a severity, a required fact, and an
/// optional solution, each possibly multilingual and possibly templated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Option<MessageId>,
    pub severity: Severity,
    pub fact: Localized,
    pub solution: Option<Localized>,
}

impl Message {
    /// Construct a message with no solution text.
    pub fn new(id: Option<MessageId>, severity: Severity, fact: Localized) -> Self {
        Message {
            id,
            severity,
            fact,
            solution: None,
        }
    }

    /// Construct a message with both fact and solution text.
    pub fn with_solution(
        id: Option<MessageId>,
        severity: Severity,
        fact: Localized,
        solution: Localized,
    ) -> Self {
        Message {
            id,
            severity,
            fact,
            solution: Some(solution),
        }
    }
}

/// Collects all [`Message`]s defined by a step's data object.
///
/// The source framework reflects over a step-data object's members looking
/// for message-valued fields; §9 of the spec replaces that with an explicit
/// registry built at construction time. Implementors own a `HashMap<id,
/// Message>` (hand-written, generated, or macro-derived) and expose it
/// through this trait so a [`StepDataCollector`] can consume it uniformly.
pub trait MessagesHolder {
    /// All messages this step-data object declares, keyed by their id (for
    /// messages that have one).
    fn messages(&self) -> &HashMap<MessageId, Message>;

    /// Look up a single message by id.
    fn message(&self, id: &str) -> Option<&Message> {
        self.messages().get(id)
    }
}

/// Consumes the message dictionaries of a collection of
/// [`MessagesHolder`]s, merging them into one id → [`Message`] catalog.
///
/// Grounded on the registry rewrite described in the spec's Design Notes:
/// rather than reflecting over a step-data object, callers hand this
/// collector already-built dictionaries.
#[derive(Debug, Default)]
pub struct StepDataCollector {
    catalog: HashMap<MessageId, Message>,
}

impl StepDataCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge in every message declared by `holder`. Later holders win on id
    /// collision.
    pub fn collect(&mut self, holder: &dyn MessagesHolder) -> &mut Self {
        for (id, message) in holder.messages() {
            self.catalog.insert(id.clone(), message.clone());
        }
        self
    }

    /// The merged catalog.
    pub fn into_catalog(self) -> HashMap<MessageId, Message> {
        self.catalog
    }

    /// Look up a message in the merged catalog.
    pub fn get(&self, id: &str) -> Option<&Message> {
        self.catalog.get(id)
    }
}

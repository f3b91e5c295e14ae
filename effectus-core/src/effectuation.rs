//! Step identity and the effectuation context stack.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a step by the file it is declared in plus its function
/// signature. Equality and hashing are structural over both fields; two
/// unrelated declarations that happen to produce the same pair collide
/// intentionally (the dedup set is keyed on this identity, not on source
/// location).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct StepId {
    pub file: String,
    pub signature: String,
}

impl StepId {
    pub fn new(file: impl Into<String>, signature: impl Into<String>) -> Self {
        StepId {
            file: file.into(),
            signature: signature.into(),
        }
    }

    /// Canonical text form: `signature@file`.
    pub fn text(&self) -> String {
        format!("{}@{}", self.signature, self.file)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// A single frame on the supervisor's effectuation stack.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Effectuation {
    Step(StepId),
    OptionalPart(String),
    DispensablePart(String),
    DescribedPart(String),
}

impl Effectuation {
    /// Encode to the canonical textual form used by the log post-processor
    /// to reconstruct a step tree from an effectuation path.
    pub fn encode(&self) -> String {
        match self {
            Effectuation::Step(id) => format!("step {}", id.text()),
            Effectuation::OptionalPart(name) => format!("optional part \"{name}\""),
            Effectuation::DispensablePart(name) => format!("dispensable part \"{name}\""),
            Effectuation::DescribedPart(desc) => format!("doing \"{desc}\""),
        }
    }

    /// Decode a canonical textual form back into an [`Effectuation`].
    /// Recognizes the prefix and parses the payload; returns `None` for
    /// unrecognized input.
    pub fn decode(text: &str) -> Option<Effectuation> {
        if let Some(rest) = text.strip_prefix("step ") {
            let (signature, file) = rest.rsplit_once('@')?;
            return Some(Effectuation::Step(StepId::new(file, signature)));
        }
        if let Some(rest) = text.strip_prefix("optional part ") {
            return Some(Effectuation::OptionalPart(unquote(rest)?));
        }
        if let Some(rest) = text.strip_prefix("dispensable part ") {
            return Some(Effectuation::DispensablePart(unquote(rest)?));
        }
        if let Some(rest) = text.strip_prefix("doing ") {
            return Some(Effectuation::DescribedPart(unquote(rest)?));
        }
        None
    }
}

fn unquote(s: &str) -> Option<String> {
    let s = s.strip_prefix('"')?.strip_suffix('"')?;
    Some(s.to_string())
}

impl fmt::Display for Effectuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_round_trips() {
        let e = Effectuation::Step(StepId::new("script1", "function1"));
        assert_eq!(e.encode(), "step function1@script1");
        assert_eq!(Effectuation::decode(&e.encode()), Some(e));
    }

    #[test]
    fn optional_part_round_trips() {
        let e = Effectuation::OptionalPart("optional part 1".to_string());
        assert_eq!(e.encode(), "optional part \"optional part 1\"");
        assert_eq!(Effectuation::decode(&e.encode()), Some(e));
    }

    #[test]
    fn dispensable_part_round_trips() {
        let e = Effectuation::DispensablePart("cleanup".to_string());
        assert_eq!(Effectuation::decode(&e.encode()), Some(e));
    }

    #[test]
    fn described_part_round_trips() {
        let e = Effectuation::DescribedPart("fetching data".to_string());
        assert_eq!(Effectuation::decode(&e.encode()), Some(e));
    }

    #[test]
    fn unrecognized_text_decodes_to_none() {
        assert_eq!(Effectuation::decode("not an effectuation"), None);
    }

    #[test]
    fn step_id_canonical_text_form() {
        let id = StepId::new("file.rs", "do_thing");
        assert_eq!(id.text(), "do_thing@file.rs");
        assert_eq!(id.to_string(), "do_thing@file.rs");
    }
}

//! Decorates every outgoing event with a textual prefix (§4.2 "Prefix
//! logger").

use effectus_core::{Logger, LoggingEvent};
use std::sync::Arc;

/// Prepends `prefix` to every language variant of `fact` (and `solution`,
/// if present) before forwarding to the wrapped logger. `close()` forwards
/// to the wrapped logger. Wrapping a [`PrefixLogger`] in another
/// [`PrefixLogger`] concatenates the prefixes, since each layer only sees
/// the event already prefixed by the layer below it.
pub struct PrefixLogger {
    prefix: String,
    inner: Arc<dyn Logger>,
}

impl std::fmt::Debug for PrefixLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefixLogger").field("prefix", &self.prefix).finish()
    }
}

impl PrefixLogger {
    pub fn new(prefix: impl Into<String>, inner: Arc<dyn Logger>) -> Self {
        PrefixLogger {
            prefix: prefix.into(),
            inner,
        }
    }
}

impl Logger for PrefixLogger {
    fn log(&self, event: &LoggingEvent) {
        self.inner.log(&event.with_prefix(&self.prefix));
    }

    fn close(&self) -> std::io::Result<()> {
        self.inner.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collecting::CollectingLogger;
    use crate::multi::MultiLogger;
    use effectus_core::{Language, Localized, Severity, Timestamp};
    use std::time::SystemTime;

    fn sample() -> LoggingEvent {
        LoggingEvent {
            message_id: None,
            severity: Severity::Info,
            execution_level: 0,
            process_id: None,
            application_name: "app".to_string(),
            fact: Localized::en("core message"),
            solution: None,
            item_info: None,
            item_position_info: None,
            effectuation_stack: Vec::new(),
            timestamp: Timestamp::new(0, SystemTime::now()),
        }
    }

    #[test]
    fn prefixes_every_language_variant() {
        let collector = Arc::new(CollectingLogger::new());
        let prefixed = PrefixLogger::new("[svc] ", collector.clone());
        prefixed.log(&sample());
        let events = collector.events();
        assert_eq!(events[0].fact.get(Language::En), Some("[svc] core message"));
    }

    #[test]
    fn prefixing_a_multi_logger_prefixes_every_childs_view() {
        let a = Arc::new(CollectingLogger::new());
        let b = Arc::new(CollectingLogger::new());
        let multi: Arc<dyn Logger> = Arc::new(MultiLogger::new(vec![a.clone(), b.clone()]));
        let prefixed = PrefixLogger::new("[x] ", multi);
        prefixed.log(&sample());
        assert_eq!(a.events()[0].fact.get(Language::En), Some("[x] core message"));
        assert_eq!(b.events()[0].fact.get(Language::En), Some("[x] core message"));
    }

    #[test]
    fn double_wrapping_concatenates_prefixes() {
        // The outer layer prefixes first, then forwards to the inner layer,
        // which prefixes again, so the inner layer's prefix ends up
        // closest to the original text.
        let collector = Arc::new(CollectingLogger::new());
        let inner: Arc<dyn Logger> = Arc::new(PrefixLogger::new("[b] ", collector.clone()));
        let outer = PrefixLogger::new("[a] ", inner);
        outer.log(&sample());
        assert_eq!(
            collector.events()[0].fact.get(Language::En),
            Some("[b] [a] core message")
        );
    }
}

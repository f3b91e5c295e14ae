//! A small multi-step pipeline exercising most of the supervisor and
//! logger pipeline at once: dedup, `force`, `optional`/`dispensable`,
//! `appease`, progress messages, and a file + print fan-out.

use effectus::core::message::{Language, Localized, Message};
use effectus::core::{Severity, StepId};
use effectus::SupervisorBuilder;
use effectus_appender::{FileLogger, FilePolicy};
use effectus_subscriber::{MultiLogger, PrintLogger};
use std::collections::HashSet;
use std::sync::Arc;

fn fetch_step(id: u32) -> StepId {
    StepId::new("demos/src/pipeline.rs", format!("fetch_item@{id}"))
}

fn main() -> std::io::Result<()> {
    let file_logger: Arc<dyn effectus_core::Logger> =
        Arc::new(FileLogger::new("pipeline.log", FilePolicy::Blocking)?);
    let print_logger: Arc<dyn effectus_core::Logger> = Arc::new(PrintLogger::new());
    let logger: Arc<dyn effectus_core::Logger> =
        Arc::new(MultiLogger::new(vec![print_logger, file_logger]));

    let mut activated = HashSet::new();
    activated.insert("send-receipt".to_string());

    let supervisor = SupervisorBuilder::new("pipeline-demo", logger)
        .activated_options(activated)
        .dispensed_with(HashSet::new())
        .build();

    let fetch_failed = Message::new(
        None,
        Severity::Warning,
        Localized::from_pairs([
            (Language::En, "failed to fetch item $1, retrying".to_string()),
            (Language::De, "Abruf von Element $1 fehlgeschlagen, erneuter Versuch".to_string()),
        ]),
    );

    for item in 1..=3 {
        supervisor.effectuate(fetch_step(item), || {
            if item == 2 {
                supervisor.log(&fetch_failed, None, false, &[&item.to_string()]);
                supervisor.force(|| {
                    supervisor.effectuate(fetch_step(item), || {
                        println!("refetched item {item}");
                    });
                });
            } else {
                println!("fetched item {item}");
            }
        });

        supervisor.optional("send-receipt", || {
            println!("sent receipt for item {item}");
        });

        supervisor.dispensable("archive-copy", || {
            println!("archived item {item}");
        });
    }

    supervisor.appease_default(|| {
        let disk_full = Message::new(None, Severity::Fatal, Localized::en("disk full"));
        supervisor.log(&disk_full, None, true, &[]);
    });

    println!("worst severity observed: {}", supervisor.worst_severity());
    supervisor.close_loggers()
}

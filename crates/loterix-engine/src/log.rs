use serde::{Deserialize, Serialize};

/// Severity of an event-log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Info,
    Error,
}

/// One human-readable line in the session's event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub kind: LogKind,
    pub message: String,
}

/// Append-only, human-readable session log.
///
/// Every recoverable error ends up here as a line instead of crashing the
/// session; the presentation layer renders the tail.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    pub fn info(&mut self, message: impl Into<String>) {
        self.entries.push(LogEntry {
            kind: LogKind::Info,
            message: message.into(),
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.entries.push(LogEntry {
            kind: LogKind::Error,
            message: message.into(),
        });
    }

    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// One scored observation for charting: which player held which score at
/// which generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionSample {
    pub generation: u32,
    pub player_id: u32,
    pub score: i64,
}

/// Append-only log of [`EvolutionSample`]s.
///
/// Generations are monotonically non-decreasing across the log; samples are
/// never mutated or pruned within a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvolutionLog {
    samples: Vec<EvolutionSample>,
}

impl EvolutionLog {
    pub fn push(&mut self, sample: EvolutionSample) {
        debug_assert!(
            self.samples
                .last()
                .is_none_or(|last| last.generation <= sample.generation),
            "evolution log generations must be non-decreasing"
        );
        self.samples.push(sample);
    }

    #[must_use]
    pub fn samples(&self) -> &[EvolutionSample] {
        &self.samples
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The best score observed in each generation, in generation order.
    /// Drives the evolution sparkline and the trainer's history export.
    #[must_use]
    pub fn best_scores(&self) -> Vec<(u32, i64)> {
        let mut best: Vec<(u32, i64)> = Vec::new();
        for sample in &self.samples {
            match best.last_mut() {
                Some((generation, score)) if *generation == sample.generation => {
                    *score = (*score).max(sample.score);
                }
                _ => best.push((sample.generation, sample.score)),
            }
        }
        best
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

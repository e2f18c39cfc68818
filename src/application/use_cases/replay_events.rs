/// Replay Events Use Case
///
/// Feeds a JSON-lines event log through a `BookService`, one event per
/// line. Blank lines are skipped. A line that fails to parse stops the
/// replay; an event the book rejects does not.
///
/// ## Line format
/// ```text
/// {"type":"add","order_id":1,"side":"B","price":100.0,"size":10}
/// {"type":"delete","order_id":1,"side":"B"}
/// {"type":"reset_begin"}
/// ```

use std::io::BufRead;

use tracing::{debug, trace};

use crate::application::services::BookService;
use crate::shared::protocol::BookEvent;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("failed to read events: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Outcome of a replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Non-blank lines read
    pub events: u64,
    pub applied: u64,
    pub rejected: u64,
}

pub struct ReplayEventsUseCase<'a> {
    service: &'a mut BookService,
}

impl<'a> ReplayEventsUseCase<'a> {
    pub fn new(service: &'a mut BookService) -> Self {
        Self { service }
    }

    pub fn execute<R: BufRead>(&mut self, reader: R) -> Result<ReplaySummary, ReplayError> {
        let mut summary = ReplaySummary::default();
        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let event: BookEvent = serde_json::from_str(line).map_err(|source| ReplayError::Parse {
                line: number + 1,
                source,
            })?;
            trace!(line = number + 1, event = event.kind(), "replaying");

            summary.events += 1;
            match self.service.apply(&event) {
                Ok(_) => summary.applied += 1,
                Err(err) => {
                    debug!(line = number + 1, %err, "event rejected during replay");
                    summary.rejected += 1;
                }
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::orderbook::AggregatedBook;
    use crate::shared::config::BookConfig;
    use std::io::Cursor;

    fn service() -> BookService {
        BookService::new(&BookConfig::new("TEST", 0.01).unwrap())
    }

    #[test]
    fn test_replay_counts_rejections() {
        let input = r#"
{"type":"add","order_id":1,"side":"B","price":100.0,"size":10}

{"type":"add","order_id":1,"side":"B","price":100.0,"size":10}
{"type":"add","order_id":2,"side":"S","price":100.02,"size":3}
"#;
        let mut service = service();
        let summary = ReplayEventsUseCase::new(&mut service)
            .execute(Cursor::new(input))
            .unwrap();

        assert_eq!(summary, ReplaySummary { events: 3, applied: 2, rejected: 1 });
        assert_eq!(service.manager().spread_ticks(), Some(2));
    }

    #[test]
    fn test_replay_reports_bad_line() {
        let input = "{\"type\":\"reset_begin\"}\n{\"type\":\"bogus\"}\n";
        let mut service = service();
        let err = ReplayEventsUseCase::new(&mut service)
            .execute(Cursor::new(input))
            .unwrap_err();

        assert!(matches!(err, ReplayError::Parse { line: 2, .. }));
    }
}

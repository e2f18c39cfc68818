/// Use Cases - operations the application exposes
///
/// ## Available Use Cases
/// - `ReplayEventsUseCase`: replays a JSON-lines event log into a book

pub mod replay_events;

pub use replay_events::{ReplayError, ReplayEventsUseCase, ReplaySummary};

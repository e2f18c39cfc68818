/// Application Layer - Use Cases and Services
///
/// Orchestrates the domain layer: event dispatch, metrics and replay.
/// Depends on the domain layer, never the other way round.
///
/// ## Modules
/// - `services`: `BookService`
/// - `use_cases`: `ReplayEventsUseCase`

pub mod services;
pub mod use_cases;

pub use services::{BookService, ServiceStats};
pub use use_cases::{ReplayError, ReplayEventsUseCase, ReplaySummary};

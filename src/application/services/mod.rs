/// Application Services
///
/// Services coordinate domain logic into runnable workflows.
///
/// ## Available Services
/// - `BookService`: per-instrument event dispatch with metrics and a
///   channel-driven run loop

pub mod book_service;

pub use book_service::{BookService, ServiceStats};

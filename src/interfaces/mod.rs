/// Interfaces Layer - External Entry Points
///
/// ## Modules
/// - `cli`: command-line replay front-end (main.rs logic)

pub mod cli;

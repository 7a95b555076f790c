//! Application state, chat session and terminal UI for the multimodal RAG assistant

mod app;
mod commands;
mod session;
mod ui;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;

pub use app::{AppSettings, AppState, TextEmbedderKind, run_ingestion};
pub use commands::ChatCommand;
pub use session::{ChatSession, HistoryEntry, Role, SessionImage, TurnOutcome};
pub use ui::{
    display_banner, handle_input_with_history, origin_label, print_help, print_report,
    print_sources,
};

// Re-export core types
pub use mmrag_core::{Error, Result};

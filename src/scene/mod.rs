/// Text layers and typed attribute edits.
pub mod layer;
/// Project files persisted by the CLI.
pub mod project;
/// Editor state and its functional updates.
pub mod state;

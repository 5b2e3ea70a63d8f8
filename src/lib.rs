pub mod autosave;
pub mod chat;
pub mod config;
pub mod geo;
pub mod llm;
pub mod meta;
pub mod notes;
pub mod persist;
pub mod scripture;
pub mod state;
pub mod store;
pub mod teleprompter;
pub mod telemetry;
pub mod trim;

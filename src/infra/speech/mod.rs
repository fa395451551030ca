pub mod command_engine;

pub use command_engine::{configured_voices, CommandSpeechEngine};

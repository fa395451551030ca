// Console layer - the operator-facing dashboard.
// Translates typed commands into presenter calls and prints the result.
// No dashboard logic lives here.

#[path = "commands.rs"]
pub mod commands;

#[path = "render.rs"]
pub mod render;

#[path = "app.rs"]
pub mod app;

pub use app::run;

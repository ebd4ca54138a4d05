//! Event loop: pulls key events off the display and launches bound commands
//!
//! Two states, Waiting and Dispatching. Events are handled strictly in
//! delivery order, one at a time; launching never waits on the command.

mod machine;
mod run;

pub use machine::Dispatcher;
pub use run::run;

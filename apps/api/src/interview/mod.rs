// Interview sessions: access gate, answer capture, completion scoring.

pub mod capture;
pub mod completion;
pub mod gate;
pub mod handlers;
pub mod prompts;
pub mod store;

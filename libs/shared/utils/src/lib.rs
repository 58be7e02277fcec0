pub mod extractor;
pub mod jwt;
pub mod locks;
pub mod state;
pub mod test_utils;
pub mod time;

pub use locks::KeyedLocks;
pub use state::AppState;
pub use time::{ClockTime, TimeParseError};

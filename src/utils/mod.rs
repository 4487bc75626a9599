// Shared helpers: clock, time formatting, numeric reductions
pub mod clock;
pub mod maths_utils;
pub mod time_utils;

pub use clock::{Clock, FixedClock, SystemClock};
pub use time_utils::TimeUtils;

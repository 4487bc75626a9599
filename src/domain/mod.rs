// Domain types and value objects
pub mod candle;
pub mod pair;
pub mod session;

// Re-export commonly used types
pub use candle::{Candle, CandleType};
pub use pair::{Pair, PairKind};
pub use session::{SessionSelector, SessionWindow, TradingSession, is_weekend, session_bucket};

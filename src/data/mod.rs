// Candle sources, caching, snapshots and the economic calendar
pub mod cache;
pub mod calendar;
pub mod candle_source;
pub mod csv_source;
pub mod snapshot;

// Re-export commonly used types
pub use cache::CachedCandleSource;
pub use calendar::{
    EventCalendar, EventLookup, JsonFileCalendar, MacroEvent, NoCalendar, StaticCalendar,
};
pub use candle_source::{
    CandleInterval, CandleRequest, CandleSource, FallbackCandleSource, FetchSpan,
    MemoryCandleSource,
};
pub use csv_source::CsvCandleSource;
pub use snapshot::{SnapshotCandleSource, SnapshotFile};

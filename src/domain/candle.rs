use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

// Define the CandleType enum
#[derive(Debug, PartialEq)]
pub enum CandleType {
    Bullish,
    Bearish,
}

// One OHLCV bar, stamped with its UTC open time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    // A constructor for convenience
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Candle {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    // A method to determine the type of candle
    pub fn get_type(&self) -> CandleType {
        if self.close > self.open {
            CandleType::Bullish
        } else {
            CandleType::Bearish
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn time_of_day(&self) -> NaiveTime {
        self.timestamp.time()
    }

    // High minus low, in price units
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    // Largest of high-low and the gaps to the previous close.
    // The first candle of a series has no previous close, so its true range is high-low.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        match prev_close {
            Some(pc) => self
                .range()
                .max((self.high - pc).abs())
                .max((self.low - pc).abs()),
            None => self.range(),
        }
    }
}

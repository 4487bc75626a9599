//! Supported instruments and pip sizes.

pub struct PipSizes {
    pub standard: f64,
    pub jpy: f64,
    pub crypto: f64,
}

pub struct PairUniverse {
    pub majors: &'static [&'static str],
    pub minors: &'static [&'static str],
    pub exotics: &'static [&'static str],
    /// Priced in whole units (pip = 1)
    pub crypto: &'static [&'static str],
    pub pip: PipSizes,
}

pub const PAIRS: PairUniverse = PairUniverse {
    majors: &[
        "EURUSD", "USDJPY", "GBPUSD", "USDCHF", "AUDUSD", "USDCAD", "NZDUSD",
    ],
    minors: &[
        "EURGBP", "EURAUD", "EURCAD", "EURCHF", "GBPJPY", "EURJPY", "GBPCHF", "AUDJPY", "NZDJPY",
        "CHFJPY",
    ],
    exotics: &[
        "USDSGD", "USDHKD", "USDZAR", "USDMXN", "USDTRY", "EURTRY", "GBPZAR",
    ],
    crypto: &["BTCUSD", "ETHUSD"],
    pip: PipSizes {
        standard: 0.0001,
        jpy: 0.01,
        crypto: 1.0,
    },
};

impl PairUniverse {
    pub fn is_supported(&self, code: &str) -> bool {
        self.all().any(|p| p == code)
    }

    pub fn is_crypto(&self, code: &str) -> bool {
        self.crypto.contains(&code)
    }

    pub fn all(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.majors
            .iter()
            .chain(self.minors.iter())
            .chain(self.exotics.iter())
            .chain(self.crypto.iter())
            .copied()
    }
}

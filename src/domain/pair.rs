use serde::{Deserialize, Serialize};

use crate::config::PAIRS;
use crate::error::AnalysisError;

/// How a pair's price maps onto pips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairKind {
    Standard,
    /// Yen-quoted: pip is 0.01
    Jpy,
    /// Crypto-style: pip is one whole unit
    Crypto,
}

#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct Pair {
    code: String,
    kind: PairKind,
}

impl Pair {
    /// Strip separators and upper-case. `eur/usd`, `EUR-USD`, `gbp_jpy` all normalize.
    /// Returns None unless the result is exactly six ASCII letters.
    pub fn normalize(text: &str) -> Option<String> {
        let normalized: String = text
            .chars()
            .filter(|c| !matches!(c, '/' | '-' | '_' | ' '))
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if normalized.len() == 6 && normalized.chars().all(|c| c.is_ascii_alphabetic()) {
            Some(normalized)
        } else {
            None
        }
    }

    /// Parse and validate against the supported instrument list.
    pub fn parse(text: &str) -> Result<Self, AnalysisError> {
        let code = Self::normalize(text).ok_or_else(|| AnalysisError::InvalidPair {
            input: text.to_string(),
            reason: "expected a 6-letter currency pair such as EUR/USD".to_string(),
        })?;
        if !PAIRS.is_supported(&code) {
            return Err(AnalysisError::InvalidPair {
                input: text.to_string(),
                reason: "unsupported pair; use EUR/USD, GBP/USD, USD/JPY, etc.".to_string(),
            });
        }
        Ok(Self::from_code(&code))
    }

    /// Build from an already-normalized code without the supported-list check.
    pub fn from_code(code: &str) -> Self {
        Self {
            code: code.to_string(),
            kind: Self::kind_of(code),
        }
    }

    pub fn kind_of(code: &str) -> PairKind {
        if PAIRS.is_crypto(code) {
            PairKind::Crypto
        } else if code.ends_with("JPY") {
            PairKind::Jpy
        } else {
            PairKind::Standard
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn kind(&self) -> PairKind {
        self.kind
    }

    pub fn base(&self) -> &str {
        &self.code[..3]
    }

    pub fn quote(&self) -> &str {
        &self.code[3..]
    }

    /// Smallest standard price increment
    pub fn pip_size(&self) -> f64 {
        match self.kind {
            PairKind::Standard => PAIRS.pip.standard,
            PairKind::Jpy => PAIRS.pip.jpy,
            PairKind::Crypto => PAIRS.pip.crypto,
        }
    }

    /// Human-readable form, e.g. "EUR/USD"
    pub fn display(&self) -> String {
        format!("{}/{}", self.base(), self.quote())
    }
}

impl std::fmt::Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

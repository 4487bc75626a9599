//! Economic calendar configuration

/// Substrings (case-insensitive) that mark an event as high impact
pub const HIGH_IMPACT_KEYWORDS: &[&str] = &[
    "NFP",
    "Non-Farm",
    "Payroll",
    "FOMC",
    "Federal Reserve",
    "Fed",
    "Interest Rate",
    "ECB",
    "European Central Bank",
    "GDP",
    "Gross Domestic",
    "CPI",
    "Inflation",
    "Consumer Price",
    "Unemployment",
    "Central Bank",
    "Policy Decision",
    "BOE",
    "Bank of England",
    "BOJ",
    "Bank of Japan",
    "RBA",
    "Reserve Bank",
];

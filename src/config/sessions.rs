//! Trading session table (all times UTC, hour/minute pairs).
//!
//! This is the single canonical session-boundary table. Overlaps are listed
//! separately and only used to label event timing.

pub struct SessionHours {
    pub name: &'static str,
    pub start: (u32, u32),
    pub end: (u32, u32),
}

pub struct SessionTable {
    pub asian: SessionHours,
    pub london: SessionHours,
    pub new_york: SessionHours,
    pub london_ny_overlap: SessionHours,
}

/// Weekly closure: Friday `close` through Sunday `reopen`
pub struct WeekendClosure {
    pub close: (u32, u32),
    pub reopen: (u32, u32),
}

pub const SESSIONS: SessionTable = SessionTable {
    asian: SessionHours {
        name: "Asian Session",
        start: (0, 0),
        end: (9, 0),
    },
    london: SessionHours {
        name: "London Session",
        start: (8, 0),
        end: (16, 0),
    },
    new_york: SessionHours {
        name: "New York Session",
        start: (13, 0),
        end: (21, 0),
    },
    london_ny_overlap: SessionHours {
        name: "London-NY overlap",
        start: (13, 0),
        end: (16, 0),
    },
};

pub const WEEKEND: WeekendClosure = WeekendClosure {
    close: (21, 0),
    reopen: (22, 0),
};

/// Session label used for the weekend short-circuit result
pub const MARKET_CLOSED_LABEL: &str = "Market Closed";

//! # System Constants
//!
//! Names and fixed texts shared across the dashboard core: the module tags the
//! stock dashboard ships with, notification wording, and the tokens used when
//! encoding a [`ParameterKey`](crate::orchestration::ParameterKey).

/// Module tags known to the stock analytics dashboard.
///
/// The orchestration core is registration-table driven and accepts any tag;
/// these exist so callers and tests don't spell them by hand.
pub mod modules {
    pub const TICKETS: &str = "tickets";
    pub const TASKS: &str = "tasks";
    pub const SCHEDULE: &str = "schedule";
    pub const INVENTORY: &str = "inventory";
    pub const AMC: &str = "amc";
    pub const ASSETS: &str = "assets";
    pub const MEETING_ROOM: &str = "meeting_room";
    pub const COMMUNITY: &str = "community";
    pub const HELPDESK: &str = "helpdesk";
    pub const ASSET_MANAGEMENT: &str = "asset_management";
    pub const INVENTORY_MANAGEMENT: &str = "inventory_management";
    pub const PARKING_MANAGEMENT: &str = "parking_management";
    pub const VISITOR_MANAGEMENT: &str = "visitor_management";
    pub const CHECKLIST_MANAGEMENT: &str = "checklist_management";
    pub const SURVEYS: &str = "surveys";

    pub const ALL: &[&str] = &[
        TICKETS,
        TASKS,
        SCHEDULE,
        INVENTORY,
        AMC,
        ASSETS,
        MEETING_ROOM,
        COMMUNITY,
        HELPDESK,
        ASSET_MANAGEMENT,
        INVENTORY_MANAGEMENT,
        PARKING_MANAGEMENT,
        VISITOR_MANAGEMENT,
        CHECKLIST_MANAGEMENT,
        SURVEYS,
    ];
}

/// User-facing notification texts
pub mod messages {
    pub const PASS_SUCCEEDED: &str = "Dashboard data updated successfully";
    pub const PASS_FAILED: &str = "Failed to fetch dashboard data";
    pub const WIDGET_FAILED_PREFIX: &str = "Failed to fetch";
    pub const NO_RESULT: &str = "No result returned from API";
    pub const REQUEST_FAILED: &str = "Request failed";
    pub const INVALID_DATE_RANGE: &str = "End date must not be before start date";
}

/// Tokens used by the parameter key encoding
pub mod key_format {
    /// Fixed-width, locale independent calendar date format
    pub const DATE_FORMAT: &str = "%Y-%m-%d";
    /// Separates the two date boundaries; never produced by `DATE_FORMAT`
    pub const RANGE_SEPARATOR: char = '_';
    /// Stands in for an absent date boundary
    pub const EMPTY_FIELD: &str = "*";
    /// Precedes each additional filter
    pub const FILTER_SEPARATOR: char = '|';
    /// Separates a filter name from its value
    pub const ASSIGN: char = '=';
    /// Escapes separator characters inside filter names and values
    pub const ESCAPE: char = '\\';
}

/// Notification kinds, as published on the event channel
pub mod events {
    pub const WIDGET_FETCH_FAILED: &str = "widget.fetch_failed";
    pub const PASS_COMPLETED: &str = "pass.completed";
    pub const PASS_FAILED: &str = "pass.failed";
    pub const VALIDATION_FAILED: &str = "filters.validation_failed";
}

/// Operational defaults
pub mod system {
    pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 16;
    pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
    pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;
}

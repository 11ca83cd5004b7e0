//! Centralized default constants for ticklist.
//!
//! Column limits here match the database schema in `migrations/`. Keep the
//! two in sync when either changes.

// =============================================================================
// TODOS
// =============================================================================

/// Maximum length of a todo title, in characters.
pub const TODO_TITLE_MAX_LEN: usize = 500;

/// Maximum length of a todo description, in characters.
pub const TODO_DESCRIPTION_MAX_LEN: usize = 1000;

// =============================================================================
// TAGS
// =============================================================================

/// Maximum length of a tag name, in characters.
pub const TAG_NAME_MAX_LEN: usize = 100;

/// Palette used for tags created without an explicit color.
pub const TAG_PALETTE: [&str; 12] = [
    "#EF4444", "#F97316", "#F59E0B", "#EAB308", "#84CC16", "#22C55E", "#14B8A6", "#06B6D4",
    "#3B82F6", "#6366F1", "#A855F7", "#EC4899",
];

// =============================================================================
// INTERACTION
// =============================================================================

/// Window in which a second click turns a pending single click into a double click.
pub const DOUBLE_CLICK_WINDOW_MS: u64 = 200;

// =============================================================================
// SESSIONS
// =============================================================================

/// Default name of the cookie carrying the session token.
pub const SESSION_COOKIE_NAME: &str = "ticklist.session_token";

//! SQL schema for the mindful SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for future migrations.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS` and `OR IGNORE`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- The single user profile. Exactly one row, id = 1.
CREATE TABLE IF NOT EXISTS progress (
    id                  INTEGER PRIMARY KEY CHECK (id = 1),
    current_streak      INTEGER NOT NULL DEFAULT 0,
    current_xp          INTEGER NOT NULL DEFAULT 0,
    last_exercise_date  TEXT,               -- YYYY-MM-DD
    last_mood_check_in  TEXT                -- YYYY-MM-DD
);
INSERT OR IGNORE INTO progress (id) VALUES (1);

-- Completions are strictly append-only.
CREATE TABLE IF NOT EXISTS exercise_completions (
    completion_id TEXT PRIMARY KEY,
    completed_at  TEXT NOT NULL,            -- RFC 3339 UTC
    day           TEXT NOT NULL,            -- calendar day at record time
    category      TEXT NOT NULL,            -- 'awareness' | 'balance' | 'reflect'
    source        TEXT NOT NULL             -- 'card_view' | 'library'
);

-- One check-in per calendar day; later same-day writes overwrite in place.
CREATE TABLE IF NOT EXISTS mood_entries (
    entry_id   TEXT PRIMARY KEY,
    logged_at  TEXT NOT NULL,
    day        TEXT NOT NULL UNIQUE,
    mood       TEXT NOT NULL,
    note       TEXT
);

-- One instance per badge definition. earned_at is set once, never cleared.
CREATE TABLE IF NOT EXISTS badges (
    badge_id   TEXT PRIMARY KEY,
    progress   INTEGER NOT NULL DEFAULT 0,
    earned_at  TEXT
);

CREATE TABLE IF NOT EXISTS reminder_settings (
    id                    INTEGER PRIMARY KEY CHECK (id = 1),
    enabled               INTEGER NOT NULL DEFAULT 0,
    mindfulness_time      TEXT    NOT NULL DEFAULT '09:00',
    permission_requested  INTEGER NOT NULL DEFAULT 0,
    permission_granted    INTEGER NOT NULL DEFAULT 0
);
INSERT OR IGNORE INTO reminder_settings (id) VALUES (1);

CREATE INDEX IF NOT EXISTS completions_day_idx      ON exercise_completions(day);
CREATE INDEX IF NOT EXISTS completions_category_idx ON exercise_completions(category);

PRAGMA user_version = 1;
";

use rusqlite::Connection;

use crate::error::Result;

/// Initialise the planner schema in `conn`. Safe to call on every startup
/// (idempotent).
///
/// Dates and times are stored as ISO-8601 text so lexicographic comparison
/// in SQL matches chronological order, which the due-window query relies on.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER NOT NULL PRIMARY KEY,
            name        TEXT    NOT NULL,
            created_at  TEXT    NOT NULL
        );

        CREATE TABLE IF NOT EXISTS dated_tasks (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            owner       INTEGER NOT NULL REFERENCES users(id),
            text        TEXT    NOT NULL,
            due_date    TEXT    NOT NULL,   -- YYYY-MM-DD
            due_time    TEXT    NOT NULL,   -- HH:MM
            created_at  TEXT    NOT NULL,
            reminded    INTEGER NOT NULL DEFAULT 0
        );

        -- Efficient polling: WHERE reminded = 0 AND due window comparison
        CREATE INDEX IF NOT EXISTS idx_dated_due
            ON dated_tasks (reminded, due_date, due_time);

        CREATE TABLE IF NOT EXISTS weekly_tasks (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            owner       INTEGER NOT NULL REFERENCES users(id),
            text        TEXT    NOT NULL,
            week_start  TEXT    NOT NULL,   -- YYYY-MM-DD, always a Monday
            completed   INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT    NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_weekly_week
            ON weekly_tasks (week_start, completed);
        ",
    )?;
    Ok(())
}

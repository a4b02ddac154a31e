use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE channels (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                kind        TEXT NOT NULL,
                topic       TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                username    TEXT NOT NULL,
                avatar_url  TEXT
            );

            CREATE TABLE posts (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                channel_id  TEXT NOT NULL REFERENCES channels(id),
                author_id   TEXT NOT NULL REFERENCES users(id),
                created_at  TEXT NOT NULL,
                answer_id   TEXT
            );

            CREATE TABLE messages (
                id          TEXT PRIMARY KEY,
                post_id     TEXT NOT NULL REFERENCES posts(id),
                author_id   TEXT NOT NULL REFERENCES users(id),
                content     TEXT NOT NULL,
                reply_to    TEXT,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX idx_messages_post
                ON messages(post_id, created_at);

            CREATE TABLE attachments (
                id            TEXT PRIMARY KEY,
                message_id    TEXT NOT NULL REFERENCES messages(id),
                url           TEXT NOT NULL,
                name          TEXT NOT NULL,
                content_type  TEXT
            );

            CREATE INDEX idx_attachments_message
                ON attachments(message_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

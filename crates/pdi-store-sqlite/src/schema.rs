//! SQL schema for the PDI SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Actors are never deleted; deactivation flips `status`.
CREATE TABLE IF NOT EXISTS actors (
    actor_id      TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL,
    role          TEXT NOT NULL,   -- 'admin' | 'gestor' | 'colaborador' | 'rh'
    status        TEXT NOT NULL DEFAULT 'ativo',
    supervisor_id TEXT REFERENCES actors(actor_id),
    team_id       TEXT REFERENCES teams(team_id),
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS teams (
    team_id    TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    leader_id  TEXT NOT NULL REFERENCES actors(actor_id),
    created_at TEXT NOT NULL
);

-- Every owned record, discriminated by `class`.
CREATE TABLE IF NOT EXISTS entities (
    entity_id          TEXT PRIMARY KEY,
    class              TEXT NOT NULL,
    owner_id           TEXT NOT NULL REFERENCES actors(actor_id),
    secondary_actor_id TEXT,            -- mentor, evaluator or parent record
    sensitivity        TEXT NOT NULL DEFAULT 'normal',
    title              TEXT NOT NULL,
    body               TEXT,
    score              INTEGER CHECK (score BETWEEN 1 AND 5),
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS actors_supervisor_idx ON actors(supervisor_id);
CREATE INDEX IF NOT EXISTS actors_team_idx       ON actors(team_id);
CREATE INDEX IF NOT EXISTS entities_owner_idx    ON entities(owner_id);
CREATE INDEX IF NOT EXISTS entities_class_idx    ON entities(class);

PRAGMA user_version = 1;
";

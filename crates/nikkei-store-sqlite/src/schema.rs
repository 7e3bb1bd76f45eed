//! SQL schema for the Nikkei SQLite store.
//!
//! Executed once at connection startup. The tables carry the same rules the
//! store checks before writing (no self reference, unique triple, closed
//! vocabularies, one registration per person and event, cascades) as a
//! backstop.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS families (
    family_id          TEXT PRIMARY KEY,
    surname            TEXT NOT NULL,
    surname_romaji     TEXT,
    surname_kanji      TEXT,
    surname_meaning    TEXT,
    origin_prefecture  TEXT,
    origin_city        TEXT,
    arrival_year       INTEGER,
    arrival_place      TEXT,
    family_history     TEXT,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL
);

-- A family cannot be removed while it still has members.
CREATE TABLE IF NOT EXISTS persons (
    person_id                TEXT PRIMARY KEY,
    family_id                TEXT NOT NULL
                             REFERENCES families(family_id) ON DELETE RESTRICT,
    given_names              TEXT NOT NULL,
    paternal_surname         TEXT NOT NULL,
    maternal_surname         TEXT,
    japanese_name            TEXT,
    kanji_name               TEXT,
    gender                   TEXT CHECK (gender IN
                               ('male', 'female', 'other', 'undisclosed')),
    birth_date               TEXT,            -- YYYY-MM-DD
    birth_place              TEXT,
    generation               TEXT NOT NULL CHECK (generation IN
                               ('issei', 'nisei', 'sansei', 'yonsei', 'gosei', 'rokusei')),
    marital_status           TEXT CHECK (marital_status IN
                               ('single', 'married', 'divorced', 'widowed', 'common_law')),
    phone                    TEXT,
    email                    TEXT,
    city                     TEXT,
    state                    TEXT NOT NULL DEFAULT 'Sinaloa',
    japanese_level           TEXT CHECK (japanese_level IN
                               ('none', 'basic', 'intermediate', 'advanced', 'native')),
    is_active_member         INTEGER NOT NULL DEFAULT 0,
    joined_on                TEXT,            -- YYYY-MM-DD
    accepts_public_directory INTEGER NOT NULL DEFAULT 0,
    accepts_communications   INTEGER NOT NULL DEFAULT 1,
    admin_notes              TEXT,
    created_at               TEXT NOT NULL,
    updated_at               TEXT NOT NULL
);

-- `relative_id` is the `relation_type` of `person_id`.
CREATE TABLE IF NOT EXISTS genealogy (
    relation_id               TEXT PRIMARY KEY,
    person_id                 TEXT NOT NULL
                              REFERENCES persons(person_id) ON DELETE CASCADE,
    relative_id               TEXT NOT NULL
                              REFERENCES persons(person_id) ON DELETE CASCADE,
    relation_type             TEXT NOT NULL CHECK (relation_type IN (
                                'father', 'mother', 'son', 'daughter',
                                'husband', 'wife', 'brother', 'sister',
                                'grandfather', 'grandmother', 'grandson', 'granddaughter',
                                'uncle', 'aunt', 'cousin_male', 'cousin_female',
                                'brother_in_law', 'sister_in_law', 'son_in_law',
                                'daughter_in_law', 'father_in_law', 'mother_in_law')),
    confirmed_by_both_parties INTEGER NOT NULL DEFAULT 0,
    confirmation_date         TEXT,
    notes                     TEXT,
    created_at                TEXT NOT NULL,
    updated_at                TEXT NOT NULL,
    UNIQUE (person_id, relative_id, relation_type),
    CHECK  (person_id != relative_id),
    CHECK  ((confirmed_by_both_parties = 0) = (confirmation_date IS NULL))
);

-- One company per owner; an owner cannot be deleted while it exists.
CREATE TABLE IF NOT EXISTS companies (
    company_id          TEXT PRIMARY KEY,
    owner_id            TEXT NOT NULL UNIQUE
                        REFERENCES persons(person_id) ON DELETE RESTRICT,
    name                TEXT NOT NULL,
    legal_name          TEXT,
    tax_id              TEXT,
    line_of_business    TEXT,
    sector              TEXT,
    description         TEXT,
    phone               TEXT,
    email               TEXT,
    website             TEXT,
    address             TEXT,
    city                TEXT,
    state               TEXT NOT NULL DEFAULT 'Sinaloa',
    postal_code         TEXT,
    founded_on          TEXT,                 -- YYYY-MM-DD
    employee_count      INTEGER CHECK (employee_count >= 0),
    listed_in_directory INTEGER NOT NULL DEFAULT 1,
    products_services   TEXT,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS events (
    event_id              TEXT PRIMARY KEY,
    organizer_id          TEXT
                          REFERENCES persons(person_id) ON DELETE SET NULL,
    title                 TEXT NOT NULL,
    description           TEXT,
    kind                  TEXT NOT NULL CHECK (kind IN
                            ('matsuri', 'reunion', 'cultural', 'sports',
                             'educational', 'business', 'ceremony')),
    starts_at             TEXT NOT NULL,
    ends_at               TEXT,
    venue                 TEXT,
    address               TEXT,
    city                  TEXT,
    max_capacity          INTEGER CHECK (max_capacity >= 0),
    requires_registration INTEGER NOT NULL DEFAULT 1,
    is_public             INTEGER NOT NULL DEFAULT 1,
    stream_url            TEXT,
    requirements          TEXT,
    organizer_contact     TEXT,
    status                TEXT NOT NULL DEFAULT 'draft' CHECK (status IN
                            ('draft', 'published', 'in_progress', 'finished', 'cancelled')),
    created_at            TEXT NOT NULL,
    updated_at            TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS participations (
    participation_id  TEXT PRIMARY KEY,
    person_id         TEXT NOT NULL
                      REFERENCES persons(person_id) ON DELETE CASCADE,
    event_id          TEXT NOT NULL
                      REFERENCES events(event_id) ON DELETE CASCADE,
    status            TEXT NOT NULL DEFAULT 'registered' CHECK (status IN
                        ('registered', 'confirmed', 'attended', 'no_show', 'cancelled')),
    registered_at     TEXT NOT NULL,
    confirmation_date TEXT,
    notes             TEXT,
    rating            INTEGER CHECK (rating BETWEEN 1 AND 5),
    comment           TEXT,
    companions        INTEGER NOT NULL DEFAULT 0 CHECK (companions >= 0),
    special_needs     TEXT,
    updated_at        TEXT NOT NULL,
    UNIQUE (person_id, event_id)
);

CREATE INDEX IF NOT EXISTS persons_family_idx     ON persons(family_id);
CREATE INDEX IF NOT EXISTS genealogy_person_idx   ON genealogy(person_id);
CREATE INDEX IF NOT EXISTS genealogy_relative_idx ON genealogy(relative_id);
CREATE INDEX IF NOT EXISTS events_start_idx       ON events(starts_at);
CREATE INDEX IF NOT EXISTS participations_event_idx ON participations(event_id);

PRAGMA user_version = 1;
";

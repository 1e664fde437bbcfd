pub const SCHEMA: &str = r#"
-- Accounts. Signup creates students; the single admin is seeded at init.
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    student_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    password_hash TEXT NOT NULL,       -- argon2id hash with embedded salt
    role TEXT NOT NULL DEFAULT 'student',
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Bearer credentials issued at signin; deleted at signout, bounded by expiry.
CREATE TABLE IF NOT EXISTS tokens (
    id TEXT PRIMARY KEY,
    token_hash TEXT NOT NULL,          -- argon2id hash with embedded salt
    token_lookup TEXT NOT NULL,        -- short prefix for fast lookup
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT DEFAULT (datetime('now')),
    expires_at TEXT NOT NULL,
    last_used_at TEXT
);

CREATE TABLE IF NOT EXISTS classrooms (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    building TEXT NOT NULL,
    capacity INTEGER NOT NULL DEFAULT 0,
    facilities TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS labs (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    building TEXT NOT NULL,
    capacity INTEGER NOT NULL DEFAULT 0,
    equipment TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS bus_routes (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Ordered stop list for a route; replaced wholesale on route update.
CREATE TABLE IF NOT EXISTS bus_stops (
    bus_id TEXT NOT NULL REFERENCES bus_routes(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    name TEXT NOT NULL,
    arrival_time TEXT,
    PRIMARY KEY (bus_id, position)
);

CREATE TABLE IF NOT EXISTS cafeteria_menu (
    id TEXT PRIMARY KEY,
    day_of_week INTEGER NOT NULL,      -- 0 = Monday .. 6 = Sunday
    meal TEXT NOT NULL,                -- breakfast | lunch | dinner
    dish TEXT NOT NULL,
    price_cents INTEGER,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS cafeteria_info (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    location TEXT NOT NULL,
    opening_hours TEXT NOT NULL,
    contact TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Recurring weekly blocks attached to a (resource_type, resource_id) pair.
-- The referenced row lives in the table named by resource_type; existence is
-- checked at the application layer on create.
CREATE TABLE IF NOT EXISTS schedules (
    id TEXT PRIMARY KEY,
    resource_type TEXT NOT NULL,       -- classroom | lab
    resource_id TEXT NOT NULL,
    day_of_week INTEGER NOT NULL,      -- 0 = Monday .. 6 = Sunday
    start_time TEXT NOT NULL,          -- HH:MM
    end_time TEXT NOT NULL,            -- HH:MM
    subject TEXT NOT NULL,
    instructor TEXT,
    course_code TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Ad-hoc reservation requests, reviewed by an admin.
CREATE TABLE IF NOT EXISTS booking_requests (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    resource_type TEXT NOT NULL,
    resource_id TEXT NOT NULL,
    date TEXT NOT NULL,                -- YYYY-MM-DD
    start_time TEXT NOT NULL,          -- HH:MM
    end_time TEXT NOT NULL,            -- HH:MM
    program_name TEXT NOT NULL,
    description TEXT,
    participant_count INTEGER,
    status TEXT NOT NULL DEFAULT 'pending',  -- pending | approved | rejected
    admin_notes TEXT,
    reviewed_by TEXT REFERENCES users(id),
    reviewed_at TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Create indexes
CREATE UNIQUE INDEX IF NOT EXISTS idx_tokens_lookup ON tokens(token_lookup);
CREATE INDEX IF NOT EXISTS idx_tokens_user ON tokens(user_id);
CREATE INDEX IF NOT EXISTS idx_schedules_resource ON schedules(resource_type, resource_id);
CREATE INDEX IF NOT EXISTS idx_bookings_user ON booking_requests(user_id);
CREATE INDEX IF NOT EXISTS idx_bookings_status ON booking_requests(status);
CREATE INDEX IF NOT EXISTS idx_bookings_resource ON booking_requests(resource_type, resource_id);
"#;

use diesel::table;

table! {
    questions (id) {
        id -> Integer,
        question -> Text,
        answer -> Text,
        category -> Nullable<Text>,
        difficulty -> Nullable<Integer>,
    }
}

table! {
    categories (id) {
        id -> Integer,
        #[sql_name = "type"]
        type_ -> Text,
    }
}

/// Idempotent table setup, run whenever a connection pool is opened.
pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    type TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS questions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    question TEXT NOT NULL,
    answer TEXT NOT NULL,
    category TEXT,
    difficulty INTEGER
);
";

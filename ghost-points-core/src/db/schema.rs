pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS layer_metadata (
    table_name TEXT PRIMARY KEY,
    geometry_type TEXT NOT NULL CHECK (geometry_type IN ('point', 'line', 'polygon', 'unknown', 'null')),
    subset_string TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS layer_fields (
    table_name TEXT NOT NULL REFERENCES layer_metadata(table_name) ON DELETE CASCADE,
    field_name TEXT NOT NULL,
    length INTEGER NOT NULL DEFAULT 0,
    precision INTEGER NOT NULL DEFAULT 0,
    comment TEXT,
    PRIMARY KEY (table_name, field_name)
);
"#;

/// Columns every layer table carries that are not attribute fields.
pub const GEOMETRY_COLUMNS: [&str; 3] = ["fid", "x", "y"];

/// Quotes an SQL identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

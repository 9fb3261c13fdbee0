//! Table definitions for the mirrored entities
//!
//! Every site gets its own three tables, named after the site. Tables are
//! created if missing; existing tables are left untouched. Statement text is
//! produced per [`Dialect`] so both stores share one set of table names and
//! columns.

/// Table names for one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteTables {
    pub gallery: String,
    pub model: String,
    pub model_gallery: String,
}

impl SiteTables {
    pub fn for_site(site_name: &str) -> Self {
        Self {
            gallery: format!("{}_gallery", site_name),
            model: format!("{}_model", site_name),
            model_gallery: format!("{}_model_gallery", site_name),
        }
    }

    /// SQLite DDL creating all three tables
    pub fn schema_sql(&self) -> String {
        self.create_statements(Dialect::Sqlite).join(";\n") + ";\n"
    }

    /// One `CREATE TABLE IF NOT EXISTS` statement per table
    pub fn create_statements(&self, dialect: Dialect) -> Vec<String> {
        let key = dialect.key_type();
        let date = dialect.date_type();
        let suffix = dialect.table_suffix();

        vec![
            format!(
                r#"CREATE TABLE IF NOT EXISTS {gallery} (
    uuid {key} NOT NULL PRIMARY KEY,
    cover_clean_image_path TEXT,
    cover_image_path TEXT,
    description TEXT,
    meta_description TEXT,
    name TEXT,
    path TEXT,
    published_at {date},
    site_uuid TEXT,
    thumbnail_cover_path TEXT,
    {type_col} TEXT,
    original_uuid TEXT,
    splash_image_path TEXT
){suffix}"#,
                gallery = dialect.quote(&self.gallery),
                type_col = dialect.quote("type"),
            ),
            format!(
                r#"CREATE TABLE IF NOT EXISTS {model} (
    uuid {key} NOT NULL PRIMARY KEY,
    biography TEXT,
    breasts TEXT,
    debut_month {date},
    global_uuid TEXT,
    hair TEXT,
    headshot_image_path TEXT,
    height INTEGER,
    name TEXT,
    path TEXT,
    site_uuid TEXT,
    chest_size TEXT,
    waist_size TEXT,
    hip_size TEXT,
    top_rank INTEGER,
    weight INTEGER,
    pubic_hair TEXT,
    publish_age INTEGER,
    ethnicity TEXT,
    eyes TEXT,
    gender TEXT
){suffix}"#,
                model = dialect.quote(&self.model),
            ),
            format!(
                r#"CREATE TABLE IF NOT EXISTS {model_gallery} (
    model_uuid {key} NOT NULL,
    gallery_uuid {key} NOT NULL,
    PRIMARY KEY (model_uuid, gallery_uuid)
){suffix}"#,
                model_gallery = dialect.quote(&self.model_gallery),
            ),
        ]
    }
}

/// SQL flavor of a destination store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    MySql,
}

impl Dialect {
    /// Quotes an SQL identifier
    pub fn quote(self, name: &str) -> String {
        match self {
            Dialect::Sqlite => format!("\"{}\"", name.replace('"', "\"\"")),
            Dialect::MySql => format!("`{}`", name.replace('`', "``")),
        }
    }

    /// Whole-row replace of `columns` in `table`, one placeholder per column
    pub fn replace_sql(self, table: &str, columns: &[&str]) -> String {
        let names = columns
            .iter()
            .map(|column| self.quote(column))
            .collect::<Vec<_>>()
            .join(", ");
        let verb = match self {
            Dialect::Sqlite => "INSERT OR REPLACE INTO",
            Dialect::MySql => "REPLACE INTO",
        };
        let placeholders = vec!["?"; columns.len()].join(", ");

        format!("{} {} ({}) VALUES ({})", verb, self.quote(table), names, placeholders)
    }

    pub fn count_sql(self, table: &str) -> String {
        format!("SELECT COUNT(*) FROM {}", self.quote(table))
    }

    pub fn count_uuid_sql(self, table: &str) -> String {
        format!("SELECT COUNT(*) FROM {} WHERE uuid = ?", self.quote(table))
    }

    // MySQL cannot index unbounded TEXT
    fn key_type(self) -> &'static str {
        match self {
            Dialect::Sqlite => "TEXT",
            Dialect::MySql => "VARCHAR(64)",
        }
    }

    fn date_type(self) -> &'static str {
        match self {
            Dialect::Sqlite => "TEXT",
            Dialect::MySql => "DATE",
        }
    }

    fn table_suffix(self) -> &'static str {
        match self {
            Dialect::Sqlite => "",
            Dialect::MySql => " DEFAULT CHARSET=utf8mb4",
        }
    }
}

/// Creates the site's tables on an SQLite connection if they do not exist yet
pub fn initialize_schema(
    conn: &rusqlite::Connection,
    tables: &SiteTables,
) -> Result<(), rusqlite::Error> {
    conn.execute_batch(&tables.schema_sql())?;
    Ok(())
}

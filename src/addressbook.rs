// addressbook.rs

use chrono::Local;
use rusqlite::{params, Connection, Row};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: String,
}

impl Contact {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            phone: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            created_at: row.get(4)?,
        })
    }

    pub fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.created_at.clone(),
        ]
    }
}

pub struct AddressBook {
    conn: Connection,
}

impl AddressBook {
    pub fn open(path: impl AsRef<Path>) -> rusqlite::Result<Self> {
        let book = Self {
            conn: Connection::open(path)?,
        };
        book.migrate()?;
        Ok(book)
    }

    #[cfg(test)]
    fn open_memory() -> rusqlite::Result<Self> {
        let book = Self {
            conn: Connection::open_in_memory()?,
        };
        book.migrate()?;
        Ok(book)
    }

    fn migrate(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS contacts (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                name       TEXT NOT NULL,
                email      TEXT,
                phone      TEXT,
                created_at TEXT NOT NULL
            );",
        )
    }

    pub fn add(&self, name: &str, email: &str, phone: &str) -> rusqlite::Result<i64> {
        self.conn.execute(
            "INSERT INTO contacts (name, email, phone, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                name,
                email,
                phone,
                Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Newest first. A non-empty `query` matches name, email or phone.
    pub fn list(&self, query: &str) -> rusqlite::Result<Vec<Contact>> {
        let contacts = if query.is_empty() {
            let mut stmt = self.conn.prepare(
                "SELECT id, name, email, phone, created_at FROM contacts
                 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt.query_map([], Contact::from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        } else {
            let mut stmt = self.conn.prepare(
                "SELECT id, name, email, phone, created_at FROM contacts
                 WHERE name LIKE ?1 OR email LIKE ?1 OR phone LIKE ?1
                 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt.query_map(params![format!("%{query}%")], Contact::from_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(contacts)
    }

    pub fn delete(&self, id: i64) -> rusqlite::Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}

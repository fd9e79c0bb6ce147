use crate::models::{ArticleFields, ArticleRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row};

/// Outcome of a user insert. The UNIQUE constraints are the final word on
/// uniqueness, so a losing racer gets the same answer as the pre-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateUser {
    Created(i64),
    UsernameTaken,
    EmailTaken,
}

const ARTICLE_COLUMNS: &str =
    "id, title, category, content, date, status, owner_id, created_at, updated_at";

impl Database {
    // -- Users --

    pub fn create_user(&self, username: &str, email: &str, password_hash: &str) -> Result<CreateUser> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (username, email, password) VALUES (?1, ?2, ?3)",
                (username, email, password_hash),
            );

            match inserted {
                Ok(_) => Ok(CreateUser::Created(conn.last_insert_rowid())),
                Err(rusqlite::Error::SqliteFailure(err, Some(msg)))
                    if err.code == ErrorCode::ConstraintViolation =>
                {
                    if msg.contains("users.username") {
                        Ok(CreateUser::UsernameTaken)
                    } else if msg.contains("users.email") {
                        Ok(CreateUser::EmailTaken)
                    } else {
                        Err(anyhow::anyhow!("Constraint violation creating user: {}", msg))
                    }
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn count_users(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?))
    }

    // -- Articles --

    pub fn insert_article(&self, owner_id: i64, fields: &ArticleFields<'_>) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO articles (title, category, content, date, status, owner_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    fields.title,
                    fields.category,
                    fields.content,
                    fields.date,
                    fields.status.as_str(),
                    owner_id
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_article(&self, id: i64) -> Result<Option<ArticleRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?1");
            let row = conn.query_row(&sql, [id], article_from_row).optional()?;
            Ok(row)
        })
    }

    pub fn list_published_articles(&self) -> Result<Vec<ArticleRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {ARTICLE_COLUMNS} FROM articles
                 WHERE status = 'published'
                 ORDER BY date DESC, id DESC"
            );
            query_articles(conn, &sql, [])
        })
    }

    pub fn list_articles_by_owner(&self, owner_id: i64) -> Result<Vec<ArticleRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {ARTICLE_COLUMNS} FROM articles
                 WHERE owner_id = ?1
                 ORDER BY date DESC, id DESC"
            );
            query_articles(conn, &sql, [owner_id])
        })
    }

    /// Rewrites an article in place. Returns false when no row matches both
    /// `id` and `owner_id`.
    pub fn update_article(&self, id: i64, owner_id: i64, fields: &ArticleFields<'_>) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE articles
                 SET title = ?1, category = ?2, content = ?3, date = ?4, status = ?5,
                     updated_at = datetime('now')
                 WHERE id = ?6 AND owner_id = ?7",
                rusqlite::params![
                    fields.title,
                    fields.category,
                    fields.content,
                    fields.date,
                    fields.status.as_str(),
                    id,
                    owner_id
                ],
            )?;
            Ok(changed == 1)
        })
    }

    pub fn delete_article(&self, id: i64, owner_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM articles WHERE id = ?1 AND owner_id = ?2",
                [id, owner_id],
            )?;
            Ok(changed == 1)
        })
    }

    pub fn count_articles(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM articles", [], |r| r.get(0))?))
    }

    // -- Contact messages --

    pub fn insert_message(
        &self,
        name: &str,
        email: &str,
        subject: Option<&str>,
        message: &str,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (name, email, subject, message) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![name, email, subject, message],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn count_messages(&self) -> Result<i64> {
        self.with_conn(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM messages", [], |r| r.get(0))?))
    }

    // -- Sessions --

    /// Inserts a new session row. False when `id` is already in use.
    pub fn insert_session(&self, id: &str, data: &str, expires_at: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO sessions (id, data, expires_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, data, expires_at],
            )?;
            Ok(inserted == 1)
        })
    }

    pub fn save_session(&self, id: &str, data: &str, expires_at: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sessions (id, data, expires_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET data = excluded.data, expires_at = excluded.expires_at",
                rusqlite::params![id, data, expires_at],
            )?;
            Ok(())
        })
    }

    /// The stored record for `id`, unless it expired at or before `now` (unix seconds).
    pub fn load_session(&self, id: &str, now: i64) -> Result<Option<String>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT data FROM sessions WHERE id = ?1 AND expires_at > ?2",
                    rusqlite::params![id, now],
                    |r| r.get(0),
                )
                .optional()?)
        })
    }

    pub fn delete_session(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM sessions WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    /// Returns how many expired rows were removed.
    pub fn delete_expired_sessions(&self, now: i64) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", [now])?))
    }
}

/// `column` is always one of our own literals, never user input.
fn query_user<P: rusqlite::ToSql>(conn: &Connection, column: &str, value: P) -> Result<Option<UserRow>> {
    let sql = format!("SELECT id, username, email, password, created_at FROM users WHERE {column} = ?1");
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_articles<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<ArticleRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, article_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn article_from_row(row: &Row<'_>) -> rusqlite::Result<ArticleRow> {
    Ok(ArticleRow {
        id: row.get(0)?,
        title: row.get(1)?,
        category: row.get(2)?,
        content: row.get(3)?,
        date: row.get(4)?,
        status: row.get(5)?,
        owner_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use storynest_types::models::ArticleStatus;

    fn fields<'a>(title: &'a str, date: &'a str, status: ArticleStatus) -> ArticleFields<'a> {
        ArticleFields {
            title,
            category: "General",
            date,
            content: "<p>body</p>",
            status,
        }
    }

    fn user(db: &Database, name: &str) -> i64 {
        match db.create_user(name, &format!("{name}@x.com"), "hash").unwrap() {
            CreateUser::Created(id) => id,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unique_constraints_report_which_column() {
        let db = Database::open_in_memory().unwrap();
        user(&db, "alice");

        assert_eq!(
            db.create_user("alice", "other@x.com", "h").unwrap(),
            CreateUser::UsernameTaken
        );
        assert_eq!(
            db.create_user("alicia", "alice@x.com", "h").unwrap(),
            CreateUser::EmailTaken
        );
        assert_eq!(db.count_users().unwrap(), 1);
    }

    #[test]
    fn user_lookups() {
        let db = Database::open_in_memory().unwrap();
        let id = user(&db, "alice");

        assert_eq!(db.get_user_by_username("alice").unwrap().unwrap().id, id);
        assert_eq!(db.get_user_by_email("alice@x.com").unwrap().unwrap().id, id);
        assert_eq!(db.get_user_by_id(id).unwrap().unwrap().username, "alice");
        assert!(db.get_user_by_username("Alice").unwrap().is_none());
        assert!(db.get_user_by_id(id + 1).unwrap().is_none());
    }

    #[test]
    fn published_listing_filters_and_orders_by_date() {
        let db = Database::open_in_memory().unwrap();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");

        db.insert_article(alice, &fields("old", "2024-01-01", ArticleStatus::Published)).unwrap();
        db.insert_article(bob, &fields("new", "2024-03-01", ArticleStatus::Published)).unwrap();
        db.insert_article(alice, &fields("hidden", "2024-05-01", ArticleStatus::Draft)).unwrap();

        let titles: Vec<String> = db
            .list_published_articles()
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["new", "old"]);

        let mine: Vec<String> = db
            .list_articles_by_owner(alice)
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(mine, vec!["hidden", "old"]);
    }

    #[test]
    fn update_and_delete_are_scoped_to_owner() {
        let db = Database::open_in_memory().unwrap();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let id = db.insert_article(alice, &fields("mine", "2024-01-01", ArticleStatus::Draft)).unwrap();

        let changed = db
            .update_article(id, bob, &fields("stolen", "2024-01-01", ArticleStatus::Published))
            .unwrap();
        assert!(!changed);
        assert!(!db.delete_article(id, bob).unwrap());
        assert_eq!(db.get_article(id).unwrap().unwrap().title, "mine");

        assert!(db.update_article(id, alice, &fields("renamed", "2024-02-02", ArticleStatus::Published)).unwrap());
        let row = db.get_article(id).unwrap().unwrap();
        assert_eq!(row.title, "renamed");
        assert_eq!(row.status, "published");

        assert!(db.delete_article(id, alice).unwrap());
        assert!(db.get_article(id).unwrap().is_none());
        assert_eq!(db.count_articles().unwrap(), 0);
    }

    #[test]
    fn articles_require_an_existing_owner() {
        let db = Database::open_in_memory().unwrap();
        let result = db.insert_article(42, &fields("orphan", "2024-01-01", ArticleStatus::Draft));
        assert!(result.is_err());
    }

    #[test]
    fn messages_store_optional_subject() {
        let db = Database::open_in_memory().unwrap();
        db.insert_message("Ann", "ann@x.com", None, "Hello").unwrap();
        db.insert_message("Ben", "ben@x.com", Some("Hi"), "There").unwrap();
        assert_eq!(db.count_messages().unwrap(), 2);

        let null_subjects: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM messages WHERE subject IS NULL", [], |r| r.get(0))?)
            })
            .unwrap();
        assert_eq!(null_subjects, 1);
    }

    #[test]
    fn sessions_expire_and_ids_stay_unique() {
        let db = Database::open_in_memory().unwrap();

        assert!(db.insert_session("a", "{}", 100).unwrap());
        assert!(!db.insert_session("a", "{\"other\":1}", 100).unwrap());
        assert_eq!(db.load_session("a", 50).unwrap().as_deref(), Some("{}"));
        assert!(db.load_session("a", 100).unwrap().is_none());

        db.save_session("a", "{\"k\":2}", 300).unwrap();
        assert_eq!(db.load_session("a", 200).unwrap().as_deref(), Some("{\"k\":2}"));

        db.save_session("b", "{}", 150).unwrap();
        assert_eq!(db.delete_expired_sessions(200).unwrap(), 1);
        assert!(db.load_session("b", 0).unwrap().is_none());

        db.delete_session("a").unwrap();
        assert!(db.load_session("a", 0).unwrap().is_none());
    }
}

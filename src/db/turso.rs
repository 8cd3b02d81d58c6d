use crate::db::migrations;
use crate::types::{AppError, PostCreate, PostResponse, PostWithVotes, Result, UserResponse};
use chrono::{DateTime, Utc};
use libsql::{Builder, Connection, Database, Row};

/// libsql-backed store for users, posts and votes.
///
/// Holds one shared connection so an in-memory database keeps its schema for
/// the life of the client.
pub struct TursoClient {
    _db: Database,
    conn: Connection,
}

/// A stored user row, including the password hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<&User> for UserResponse {
    type Error = AppError;

    fn try_from(user: &User) -> Result<Self> {
        Ok(UserResponse {
            id: user.id,
            email: user.email.clone(),
            created_at: timestamp(user.created_at)?,
            updated_at: timestamp(user.updated_at)?,
        })
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| AppError::Database(format!("Invalid timestamp: {}", secs)))
}

fn db_err(e: libsql::Error) -> AppError {
    AppError::Database(e.to_string())
}

fn is_unique_violation(e: &libsql::Error) -> bool {
    e.to_string().contains("UNIQUE constraint failed")
}

const POST_COLUMNS: &str = "p.id, p.title, p.content, p.published, p.created_at, p.owner_id,
     u.id, u.email, u.created_at, u.updated_at";

fn post_from_row(row: &Row) -> Result<PostResponse> {
    Ok(PostResponse {
        id: row.get(0).map_err(db_err)?,
        title: row.get(1).map_err(db_err)?,
        content: row.get(2).map_err(db_err)?,
        published: row.get::<i64>(3).map_err(db_err)? != 0,
        created_at: timestamp(row.get(4).map_err(db_err)?)?,
        owner_id: row.get(5).map_err(db_err)?,
        owner: UserResponse {
            id: row.get(6).map_err(db_err)?,
            email: row.get(7).map_err(db_err)?,
            created_at: timestamp(row.get(8).map_err(db_err)?)?,
            updated_at: timestamp(row.get(9).map_err(db_err)?)?,
        },
    })
}

fn user_from_row(row: &Row) -> Result<User> {
    Ok(User {
        id: row.get(0).map_err(db_err)?,
        email: row.get(1).map_err(db_err)?,
        password_hash: row.get(2).map_err(db_err)?,
        created_at: row.get(3).map_err(db_err)?,
        updated_at: row.get(4).map_err(db_err)?,
    })
}

impl TursoClient {
    /// Connects to a remote Turso database.
    pub async fn new_remote(url: String, auth_token: String) -> Result<Self> {
        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Turso: {}", e)))?;

        Self::from_database(db).await
    }

    /// Opens (or creates) a local SQLite file.
    pub async fn new_local(path: &str) -> Result<Self> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database {}: {}", path, e)))?;

        Self::from_database(db).await
    }

    /// Ephemeral in-memory database, mainly for tests.
    pub async fn new_memory() -> Result<Self> {
        Self::new_local(":memory:").await
    }

    async fn from_database(db: Database) -> Result<Self> {
        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| AppError::Database(format!("Failed to enable foreign keys: {}", e)))?;

        let client = Self { _db: db, conn };
        client.migrate().await?;

        Ok(client)
    }

    pub fn connection(&self) -> Result<Connection> {
        Ok(self.conn.clone())
    }

    /// Applies pending schema migrations, returning the versions applied.
    pub async fn migrate(&self) -> Result<Vec<i64>> {
        migrations::run(&self.conn).await
    }

    // User operations
    pub async fn create_user(&self, email: &str, password_hash: &str) -> Result<User> {
        let now = Utc::now().timestamp();
        // Local connections report the constraint on the first step, remote
        // ones on the query itself.
        let insert_err = |e: libsql::Error| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("User with email {} already exists", email))
            } else {
                AppError::Database(format!("Failed to create user: {}", e))
            }
        };

        let mut rows = self
            .conn
            .query(
                "INSERT INTO users (email, password_hash, created_at, updated_at)
                 VALUES (?, ?, ?, ?) RETURNING id",
                (email, password_hash, now, now),
            )
            .await
            .map_err(&insert_err)?;

        let id: i64 = rows
            .next()
            .await
            .map_err(&insert_err)?
            .ok_or_else(|| AppError::Database("Insert returned no id".to_string()))?
            .get(0)
            .map_err(db_err)?;

        Ok(User {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, email, password_hash, created_at, updated_at
                 FROM users WHERE id = ?",
                [id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user: {}", e)))?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, email, password_hash, created_at, updated_at
                 FROM users WHERE email = ?",
                [email],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query user: {}", e)))?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(user_from_row(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, email, password_hash, created_at, updated_at
                 FROM users ORDER BY id ASC",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query users: {}", e)))?;

        let mut users = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            users.push(user_from_row(&row)?);
        }

        Ok(users)
    }

    // Post operations
    pub async fn create_post(&self, owner_id: i64, post: &PostCreate) -> Result<PostResponse> {
        let now = Utc::now().timestamp();

        let mut rows = self
            .conn
            .query(
                "INSERT INTO posts (title, content, published, created_at, updated_at, owner_id)
                 VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
                (
                    post.title.as_str(),
                    post.content.as_str(),
                    post.published as i64,
                    now,
                    now,
                    owner_id,
                ),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create post: {}", e)))?;

        let id: i64 = rows
            .next()
            .await
            .map_err(db_err)?
            .ok_or_else(|| AppError::Database("Insert returned no id".to_string()))?
            .get(0)
            .map_err(db_err)?;
        drop(rows);

        self.get_post(id)
            .await?
            .map(|p| p.post)
            .ok_or_else(|| AppError::Database(format!("Post {} vanished after insert", id)))
    }

    pub async fn get_post(&self, id: i64) -> Result<Option<PostWithVotes>> {
        let sql = format!(
            "SELECT {POST_COLUMNS}, COUNT(v.post_id)
             FROM posts p
             JOIN users u ON u.id = p.owner_id
             LEFT JOIN votes v ON v.post_id = p.id
             WHERE p.id = ?
             GROUP BY p.id"
        );

        let mut rows = self
            .conn
            .query(&sql, [id])
            .await
            .map_err(|e| AppError::Database(format!("Failed to query post: {}", e)))?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(PostWithVotes {
                post: post_from_row(&row)?,
                votes: row.get(10).map_err(db_err)?,
            })),
            None => Ok(None),
        }
    }

    /// Lists posts whose title contains `search` (case-insensitive), ordered
    /// by id.
    pub async fn list_posts(&self, limit: i64, skip: i64, search: &str) -> Result<Vec<PostWithVotes>> {
        let sql = format!(
            "SELECT {POST_COLUMNS}, COUNT(v.post_id)
             FROM posts p
             JOIN users u ON u.id = p.owner_id
             LEFT JOIN votes v ON v.post_id = p.id
             WHERE instr(lower(p.title), lower(?)) > 0
             GROUP BY p.id
             ORDER BY p.id ASC
             LIMIT ? OFFSET ?"
        );

        let mut rows = self
            .conn
            .query(&sql, (search, limit, skip))
            .await
            .map_err(|e| AppError::Database(format!("Failed to query posts: {}", e)))?;

        let mut posts = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            posts.push(PostWithVotes {
                post: post_from_row(&row)?,
                votes: row.get(10).map_err(db_err)?,
            });
        }

        Ok(posts)
    }

    /// Overwrites a post's fields. Returns `false` when no post has `id`.
    pub async fn update_post(&self, id: i64, post: &PostCreate) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                "UPDATE posts SET title = ?, content = ?, published = ?, updated_at = ?
                 WHERE id = ?",
                (
                    post.title.as_str(),
                    post.content.as_str(),
                    post.published as i64,
                    Utc::now().timestamp(),
                    id,
                ),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to update post: {}", e)))?;

        Ok(changed > 0)
    }

    /// Deletes a post and, through the cascade, its votes.
    pub async fn delete_post(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM posts WHERE id = ?", [id])
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete post: {}", e)))?;

        Ok(changed > 0)
    }

    // Vote operations
    pub async fn vote_exists(&self, user_id: i64, post_id: i64) -> Result<bool> {
        let mut rows = self
            .conn
            .query(
                "SELECT 1 FROM votes WHERE user_id = ? AND post_id = ?",
                (user_id, post_id),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query vote: {}", e)))?;

        Ok(rows.next().await.map_err(db_err)?.is_some())
    }

    pub async fn add_vote(&self, user_id: i64, post_id: i64) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO votes (user_id, post_id) VALUES (?, ?)",
                (user_id, post_id),
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict(format!(
                        "User {} has already voted on post {}",
                        user_id, post_id
                    ))
                } else {
                    AppError::Database(format!("Failed to add vote: {}", e))
                }
            })?;

        Ok(())
    }

    /// Removes a vote. Returns `false` when there was none.
    pub async fn remove_vote(&self, user_id: i64, post_id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute(
                "DELETE FROM votes WHERE user_id = ? AND post_id = ?",
                (user_id, post_id),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to remove vote: {}", e)))?;

        Ok(changed > 0)
    }

    pub async fn count_votes(&self, post_id: i64) -> Result<i64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM votes WHERE post_id = ?", [post_id])
            .await
            .map_err(|e| AppError::Database(format!("Failed to count votes: {}", e)))?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => row.get(0).map_err(db_err),
            None => Ok(0),
        }
    }
}

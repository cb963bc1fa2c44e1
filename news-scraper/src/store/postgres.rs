use crate::types::{ArticleStore, CandidateRecord, Comment, PersistedRecord, Result, StoreAdapter, StoreError};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

const ARTICLE_COLUMNS: &str = r#"
    a.id, a.title, a.summary, a.link, a.image, a.saved, a.created_at,
    ARRAY(SELECT c.id FROM comments c WHERE c.article_id = a.id ORDER BY c.position) AS comments
"#;

/// Articles and comments in PostgreSQL.
///
/// Titles carry no unique constraint: deduplication happens in the ingestion
/// run against its snapshot, and two equal titles in one page are both kept.
pub struct PgArticleStore {
    pool: PgPool,
}

impl PgArticleStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub async fn setup_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id UUID PRIMARY KEY,
                title TEXT NOT NULL,
                summary TEXT NOT NULL DEFAULT '',
                link TEXT NOT NULL DEFAULT '',
                image TEXT NOT NULL,
                saved BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                position BIGSERIAL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Tables created before insertion order was tracked
        sqlx::query("ALTER TABLE articles ADD COLUMN IF NOT EXISTS position BIGSERIAL")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id UUID PRIMARY KEY,
                article_id UUID NOT NULL REFERENCES articles(id) ON DELETE CASCADE,
                body TEXT NOT NULL,
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
                position BIGSERIAL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS comments_article_id_idx ON comments (article_id, position)")
            .execute(&self.pool)
            .await?;

        info!("Database schema ready");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn article_from_row(row: &PgRow) -> std::result::Result<PersistedRecord, sqlx::Error> {
    Ok(PersistedRecord {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        summary: row.try_get("summary")?,
        link: row.try_get("link")?,
        image: row.try_get("image")?,
        saved: row.try_get("saved")?,
        comments: row.try_get("comments")?,
        created_at: row.try_get("created_at")?,
    })
}

fn comment_from_row(row: &PgRow) -> std::result::Result<Comment, sqlx::Error> {
    Ok(Comment {
        id: row.try_get("id")?,
        article_id: row.try_get("article_id")?,
        body: row.try_get("body")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl StoreAdapter for PgArticleStore {
    async fn list_all_titles(&self) -> std::result::Result<Vec<String>, StoreError> {
        let rows = sqlx::query("SELECT title FROM articles")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        rows.iter()
            .map(|r| r.try_get::<String, _>("title"))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::backend)
    }

    async fn create(&self, record: CandidateRecord) -> std::result::Result<PersistedRecord, StoreError> {
        let persisted = PersistedRecord::from_candidate(record);

        sqlx::query(
            r#"
            INSERT INTO articles (id, title, summary, link, image, saved, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(persisted.id)
        .bind(&persisted.title)
        .bind(&persisted.summary)
        .bind(&persisted.link)
        .bind(&persisted.image)
        .bind(persisted.saved)
        .bind(persisted.created_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        debug!("Inserted article {}", persisted.id);
        Ok(persisted)
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn list_articles(&self, saved_only: bool) -> std::result::Result<Vec<PersistedRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM articles a WHERE ($1 = FALSE OR a.saved = TRUE) ORDER BY a.created_at DESC, a.position DESC",
            ARTICLE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(saved_only)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        rows.iter()
            .map(article_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::backend)
    }

    async fn get_article(&self, id: Uuid) -> std::result::Result<PersistedRecord, StoreError> {
        let sql = format!("SELECT {} FROM articles a WHERE a.id = $1", ARTICLE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        match row {
            Some(row) => article_from_row(&row).map_err(StoreError::backend),
            None => Err(StoreError::NotFound { id }),
        }
    }

    async fn set_saved(&self, id: Uuid, saved: bool) -> std::result::Result<PersistedRecord, StoreError> {
        let result = sqlx::query("UPDATE articles SET saved = $2 WHERE id = $1")
            .bind(id)
            .bind(saved)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id });
        }
        self.get_article(id).await
    }

    async fn add_comment(&self, article_id: Uuid, body: String) -> std::result::Result<PersistedRecord, StoreError> {
        if body.trim().is_empty() {
            return Err(StoreError::Invalid("comment body is empty".to_string()));
        }

        let comment = Comment::new(article_id, body);
        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;

        let exists = sqlx::query("SELECT 1 FROM articles WHERE id = $1 FOR UPDATE")
            .bind(article_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(StoreError::backend)?;
        if exists.is_none() {
            return Err(StoreError::NotFound { id: article_id });
        }

        sqlx::query("INSERT INTO comments (id, article_id, body, created_at) VALUES ($1, $2, $3, $4)")
            .bind(comment.id)
            .bind(comment.article_id)
            .bind(&comment.body)
            .bind(comment.created_at)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::backend)?;

        tx.commit().await.map_err(StoreError::backend)?;
        debug!("Added comment {} to article {}", comment.id, article_id);

        self.get_article(article_id).await
    }

    async fn list_comments(&self, article_id: Uuid) -> std::result::Result<Vec<Comment>, StoreError> {
        // Distinguish "no comments" from "no article"
        self.get_article(article_id).await?;

        let rows = sqlx::query(
            "SELECT id, article_id, body, created_at FROM comments WHERE article_id = $1 ORDER BY position",
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::backend)?;

        rows.iter()
            .map(comment_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::backend)
    }

    async fn delete_comment(&self, comment_id: Uuid) -> std::result::Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id: comment_id });
        }
        Ok(())
    }
}

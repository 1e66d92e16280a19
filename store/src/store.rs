//! Durable Store (component C3): row-based persistence for symbols, edges,
//! per-(repo,branch) snapshots, vector embeddings, reviews, comments,
//! feedback signals and PR-iteration state.

use chrono::Utc;
use serde_json::Value as Json;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use symbol_graph::{BodyRange, Edge, EdgeKind, Symbol, SymbolKind};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::errors::{Error, StoreResult};
use crate::rows::{CommentRow, FeedbackSignal, ReviewRow, Severity, Verdict};

pub struct Store {
    pool: PgPool,
}

impl Store {
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Runs the embedded migrations. Every statement in them is idempotent,
    /// so calling this on every startup is safe regardless of prior schema
    /// state.
    #[instrument(skip(self))]
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("store migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // ── Branch index ──

    pub async fn register_branch(&self, repo_id: &str, branch: &str) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO branches (repo_id, branch) VALUES ($1, $2)
             ON CONFLICT (repo_id, branch) DO NOTHING",
        )
        .bind(repo_id)
        .bind(branch)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_branches(&self) -> StoreResult<Vec<(String, String)>> {
        let rows = sqlx::query("SELECT repo_id, branch FROM branches")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| (r.get("repo_id"), r.get("branch")))
            .collect())
    }

    // ── Symbols / edges ──

    #[instrument(skip(self, symbols))]
    pub async fn save_symbols(&self, symbols: &[Symbol], repo_id: &str, branch: &str) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for s in symbols {
            sqlx::query(
                r#"
                INSERT INTO symbols (id, repo_id, branch, file_path, name, qualified_name, kind, signature, start_line, end_line, doc_comment)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                ON CONFLICT (id, repo_id, branch) DO UPDATE SET
                    file_path = EXCLUDED.file_path,
                    name = EXCLUDED.name,
                    qualified_name = EXCLUDED.qualified_name,
                    kind = EXCLUDED.kind,
                    signature = EXCLUDED.signature,
                    start_line = EXCLUDED.start_line,
                    end_line = EXCLUDED.end_line,
                    doc_comment = EXCLUDED.doc_comment
                "#,
            )
            .bind(&s.id)
            .bind(repo_id)
            .bind(branch)
            .bind(&s.file_path)
            .bind(&s.name)
            .bind(&s.qualified_name)
            .bind(kind_to_str(s.kind))
            .bind(&s.signature)
            .bind(s.body_range.start_line as i64)
            .bind(s.body_range.end_line as i64)
            .bind(&s.doc_comment)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self, edges))]
    pub async fn save_edges(&self, edges: &[Edge], repo_id: &str, branch: &str) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for e in edges {
            sqlx::query(
                "INSERT INTO edges (from_id, to_id, kind, repo_id, branch) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&e.from)
            .bind(&e.to)
            .bind(edge_kind_to_str(e.kind))
            .bind(repo_id)
            .bind(branch)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Removes every symbol belonging to `path`, every edge whose endpoint
    /// references one of those symbol ids (by prefix, since `calls` edges
    /// may target a bare name rather than a full id), and every embedding
    /// for those symbol ids — all inside one transaction.
    #[instrument(skip(self))]
    pub async fn delete_by_file(&self, path: &str, repo_id: &str, branch: &str) -> StoreResult<()> {
        let prefix = format!("{path}:");
        let mut tx = self.pool.begin().await?;

        let ids: Vec<String> = sqlx::query(
            "SELECT id FROM symbols WHERE repo_id = $1 AND branch = $2 AND file_path = $3",
        )
        .bind(repo_id)
        .bind(branch)
        .bind(path)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|r| r.get::<String, _>("id"))
        .collect();

        sqlx::query("DELETE FROM symbols WHERE repo_id = $1 AND branch = $2 AND file_path = $3")
            .bind(repo_id)
            .bind(branch)
            .bind(path)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "DELETE FROM edges WHERE repo_id = $1 AND branch = $2 AND (from_id LIKE $3 OR to_id LIKE $3)",
        )
        .bind(repo_id)
        .bind(branch)
        .bind(format!("{prefix}%"))
        .execute(&mut *tx)
        .await?;

        for id in &ids {
            sqlx::query("DELETE FROM embeddings WHERE repo_id = $1 AND branch = $2 AND symbol_id = $3")
                .bind(repo_id)
                .bind(branch)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_all_for_branch(&self, repo_id: &str, branch: &str) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM symbols WHERE repo_id = $1 AND branch = $2")
            .bind(repo_id)
            .bind(branch)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM edges WHERE repo_id = $1 AND branch = $2")
            .bind(repo_id)
            .bind(branch)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM embeddings WHERE repo_id = $1 AND branch = $2")
            .bind(repo_id)
            .bind(branch)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM graph_snapshots WHERE repo_id = $1 AND branch = $2")
            .bind(repo_id)
            .bind(branch)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn load_all(&self, repo_id: &str, branch: &str) -> StoreResult<(Vec<Symbol>, Vec<Edge>)> {
        let symbol_rows = sqlx::query(
            "SELECT id, file_path, name, qualified_name, kind, signature, start_line, end_line, doc_comment
             FROM symbols WHERE repo_id = $1 AND branch = $2",
        )
        .bind(repo_id)
        .bind(branch)
        .fetch_all(&self.pool)
        .await?;

        let symbols = symbol_rows
            .into_iter()
            .map(|r| {
                Symbol::new(
                    repo_id,
                    r.get::<String, _>("file_path"),
                    r.get::<String, _>("name"),
                    r.get::<String, _>("qualified_name"),
                    kind_from_str(&r.get::<String, _>("kind")),
                    r.get::<String, _>("signature"),
                    BodyRange::new(
                        r.get::<i64, _>("start_line") as usize,
                        r.get::<i64, _>("end_line") as usize,
                    ),
                    r.get::<Option<String>, _>("doc_comment"),
                )
            })
            .collect();

        let edge_rows = sqlx::query("SELECT from_id, to_id, kind FROM edges WHERE repo_id = $1 AND branch = $2")
            .bind(repo_id)
            .bind(branch)
            .fetch_all(&self.pool)
            .await?;

        let edges = edge_rows
            .into_iter()
            .map(|r| {
                Edge::new(
                    r.get::<String, _>("from_id"),
                    r.get::<String, _>("to_id"),
                    edge_kind_from_str(&r.get::<String, _>("kind")),
                    repo_id,
                )
            })
            .collect();

        Ok((symbols, edges))
    }

    pub async fn save_graph_snapshot(&self, repo_id: &str, branch: &str, snapshot: &Json) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO graph_snapshots (repo_id, branch, snapshot, updated_at) VALUES ($1, $2, $3, $4)
             ON CONFLICT (repo_id, branch) DO UPDATE SET snapshot = EXCLUDED.snapshot, updated_at = EXCLUDED.updated_at",
        )
        .bind(repo_id)
        .bind(branch)
        .bind(snapshot)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn load_graph_snapshot(&self, repo_id: &str, branch: &str) -> StoreResult<Option<Json>> {
        let row = sqlx::query("SELECT snapshot FROM graph_snapshots WHERE repo_id = $1 AND branch = $2")
            .bind(repo_id)
            .bind(branch)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<Json, _>("snapshot")))
    }

    // ── Embeddings ──

    /// Checks the configured dimension against the last-seen one for
    /// `provider`. On mismatch, drops and recreates the embeddings table
    /// (re-embedding is expected to follow) and records the new dimension.
    #[instrument(skip(self))]
    pub async fn ensure_embedding_dim(&self, provider: &str, dim: usize) -> StoreResult<()> {
        let existing: Option<i64> = sqlx::query("SELECT dim FROM embedding_meta WHERE provider = $1")
            .bind(provider)
            .fetch_optional(&self.pool)
            .await?
            .map(|r| r.get("dim"));

        if let Some(existing) = existing {
            if existing as usize != dim {
                warn!(provider, existing, dim, "embedding dimension changed, dropping stored vectors");
                sqlx::query("DELETE FROM embeddings").execute(&self.pool).await?;
            }
        }

        sqlx::query(
            "INSERT INTO embedding_meta (provider, dim) VALUES ($1, $2)
             ON CONFLICT (provider) DO UPDATE SET dim = EXCLUDED.dim",
        )
        .bind(provider)
        .bind(dim as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn upsert_embedding(&self, symbol_id: &str, repo_id: &str, branch: &str, vector: &[f32]) -> StoreResult<()> {
        let json = serde_json::to_value(vector)?;
        sqlx::query(
            "INSERT INTO embeddings (symbol_id, repo_id, branch, vector) VALUES ($1, $2, $3, $4)
             ON CONFLICT (symbol_id, repo_id, branch) DO UPDATE SET vector = EXCLUDED.vector",
        )
        .bind(symbol_id)
        .bind(repo_id)
        .bind(branch)
        .bind(json)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Loads every stored embedding for a repo. Cosine ranking happens in
    /// the embedding-adapter crate, not here — the store's job is
    /// persistence, not vector math.
    pub async fn load_embeddings(&self, repo_id: &str, branch: &str) -> StoreResult<Vec<(String, Vec<f32>)>> {
        let rows = sqlx::query("SELECT symbol_id, vector FROM embeddings WHERE repo_id = $1 AND branch = $2")
            .bind(repo_id)
            .bind(branch)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|r| {
                let vector: Json = r.get("vector");
                let vector: Vec<f32> = serde_json::from_value(vector)?;
                Ok((r.get::<String, _>("symbol_id"), vector))
            })
            .collect()
    }

    // ── Reviews / comments ──

    pub async fn save_review(&self, review: &ReviewRow) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO reviews (review_id, repo_id, pr_number, verdict, comment_count) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(review.review_id)
        .bind(&review.repo_id)
        .bind(review.pr_number)
        .bind(review.verdict.as_str())
        .bind(review.comment_count)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn save_comment(&self, comment: &CommentRow) -> StoreResult<()> {
        let embedding = match &comment.embedding {
            Some(v) => Some(serde_json::to_value(v)?),
            None => None,
        };
        sqlx::query(
            r#"
            INSERT INTO comments (id, review_id, repo_id, pr_number, path, line, body, severity, confidence, embedding)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(comment.id)
        .bind(comment.review_id)
        .bind(&comment.repo_id)
        .bind(comment.pr_number)
        .bind(&comment.path)
        .bind(comment.line)
        .bind(&comment.body)
        .bind(comment.severity.as_str())
        .bind(comment.confidence)
        .bind(embedding)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Comments in `repo_id` carrying the given feedback signal and a
    /// stored embedding, used to build the RAG "prior/rejected examples"
    /// sets.
    pub async fn load_comments_with_feedback(&self, repo_id: &str, signal: FeedbackSignal) -> StoreResult<Vec<CommentRow>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.review_id, c.repo_id, c.pr_number, c.path, c.line, c.body, c.severity, c.confidence, c.embedding
            FROM comments c
            JOIN comment_feedback f ON f.comment_id = c.id
            WHERE c.repo_id = $1 AND f.signal = $2 AND c.embedding IS NOT NULL
            "#,
        )
        .bind(repo_id)
        .bind(signal.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                let embedding: Option<Json> = r.get("embedding");
                let embedding = embedding.map(serde_json::from_value).transpose()?;
                Ok(CommentRow {
                    id: r.get("id"),
                    review_id: r.get("review_id"),
                    repo_id: r.get("repo_id"),
                    pr_number: r.get("pr_number"),
                    path: r.get("path"),
                    line: r.get("line"),
                    body: r.get("body"),
                    severity: Severity::parse(&r.get::<String, _>("severity")),
                    confidence: r.get("confidence"),
                    embedding,
                })
            })
            .collect()
    }

    pub async fn upsert_feedback(&self, comment_id: Uuid, signal: FeedbackSignal) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO comment_feedback (comment_id, signal) VALUES ($1, $2)
             ON CONFLICT (comment_id) DO UPDATE SET signal = EXCLUDED.signal, recorded_at = now()",
        )
        .bind(comment_id)
        .bind(signal.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ── PR iteration state ──

    pub async fn read_iteration_state(&self, repo_id: &str, pr_number: i64, platform: &str) -> StoreResult<Option<i64>> {
        let row = sqlx::query(
            "SELECT last_reviewed_iteration FROM pr_iteration_state WHERE repo_id = $1 AND pr_number = $2 AND platform = $3",
        )
        .bind(repo_id)
        .bind(pr_number)
        .bind(platform)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.get("last_reviewed_iteration")))
    }

    pub async fn write_iteration_state(&self, repo_id: &str, pr_number: i64, platform: &str, iteration: i64) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO pr_iteration_state (repo_id, pr_number, platform, last_reviewed_iteration)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (repo_id, pr_number, platform) DO UPDATE SET last_reviewed_iteration = EXCLUDED.last_reviewed_iteration
            "#,
        )
        .bind(repo_id)
        .bind(pr_number)
        .bind(platform)
        .bind(iteration)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn kind_to_str(kind: SymbolKind) -> &'static str {
    match kind {
        SymbolKind::Class => "class",
        SymbolKind::Interface => "interface",
        SymbolKind::Function => "function",
        SymbolKind::Method => "method",
        SymbolKind::Type => "type",
    }
}

fn kind_from_str(s: &str) -> SymbolKind {
    match s {
        "class" => SymbolKind::Class,
        "interface" => SymbolKind::Interface,
        "method" => SymbolKind::Method,
        "type" => SymbolKind::Type,
        _ => SymbolKind::Function,
    }
}

fn edge_kind_to_str(kind: EdgeKind) -> &'static str {
    match kind {
        EdgeKind::Calls => "calls",
        EdgeKind::Inherits => "inherits",
        EdgeKind::Implements => "implements",
        EdgeKind::Imports => "imports",
    }
}

fn edge_kind_from_str(s: &str) -> EdgeKind {
    match s {
        "inherits" => EdgeKind::Inherits,
        "implements" => EdgeKind::Implements,
        "imports" => EdgeKind::Imports,
        _ => EdgeKind::Calls,
    }
}

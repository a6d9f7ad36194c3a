//! # Calculation Repository
//!
//! Database operations for the calculation log.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  calculations                         calculation_items                 │
//! │  ┌──────────┬───────┬───────┬─────┐   ┌──────────┬──────┬──────────┐   │
//! │  │ id       │ items │ total │packs│   │ calc_id  │ size │ quantity │   │
//! │  ├──────────┼───────┼───────┼─────┤   ├──────────┼──────┼──────────┤   │
//! │  │ 6f1c...  │ 12001 │ 12250 │  4  │◄──│ 6f1c...  │  250 │    1     │   │
//! │  └──────────┴───────┴───────┴─────┘   │ 6f1c...  │ 2000 │    1     │   │
//! │                                       │ 6f1c...  │ 5000 │    2     │   │
//! │                                       └──────────┴──────┴──────────┘   │
//! │                                                                         │
//! │  Both tables are written in one transaction. Items cascade on delete.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use packcalc_core::{Breakdown, CalculationRecord};

/// Row shape of the `calculations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct CalculationRow {
    id: String,
    items: i64,
    total_items: i64,
    pack_count: i64,
    created_at: DateTime<Utc>,
}

/// Row shape of the `calculation_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ItemRow {
    calculation_id: String,
    pack_size: i64,
    quantity: i64,
}

/// Repository for calculation log operations.
#[derive(Debug, Clone)]
pub struct CalculationRepository {
    pool: SqlitePool,
}

impl CalculationRepository {
    /// Creates a new CalculationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CalculationRepository { pool }
    }

    /// Appends one record and its breakdown atomically.
    pub async fn append(&self, record: &CalculationRecord) -> DbResult<()> {
        debug!(id = %record.id, items = record.items, "Appending calculation");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO calculations (id, items, total_items, pack_count, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&record.id)
        .bind(record.items)
        .bind(record.total_items)
        .bind(record.pack_count)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        for (size, quantity) in record.breakdown.iter() {
            sqlx::query(
                r#"
                INSERT INTO calculation_items (calculation_id, pack_size, quantity)
                VALUES (?1, ?2, ?3)
                "#,
            )
            .bind(&record.id)
            .bind(size)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Most recent records first, at most `limit` of them.
    ///
    /// Headers and items are read inside one transaction, so appends that
    /// land between the two queries are invisible to both.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<CalculationRecord>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let rows = sqlx::query_as::<_, CalculationRow>(
            r#"
            SELECT id, items, total_items, pack_count, created_at
            FROM calculations
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *tx)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        // Items for exactly the headers above, never a recomputed window
        let placeholders = vec!["?"; rows.len()].join(", ");
        let sql = format!(
            "SELECT calculation_id, pack_size, quantity FROM calculation_items WHERE calculation_id IN ({})",
            placeholders
        );
        let mut query = sqlx::query_as::<_, ItemRow>(&sql);
        for row in &rows {
            query = query.bind(&row.id);
        }
        let items = query.fetch_all(&mut *tx).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut by_id: HashMap<String, Breakdown> = HashMap::with_capacity(rows.len());
        for item in items {
            by_id
                .entry(item.calculation_id)
                .or_default()
                .insert(item.pack_size, item.quantity);
        }

        let records = rows
            .into_iter()
            .map(|row| {
                let breakdown = by_id.remove(&row.id).unwrap_or_default();
                assemble(row, breakdown)
            })
            .collect::<DbResult<Vec<_>>>()?;

        debug!(count = records.len(), limit, "Loaded recent calculations");
        Ok(records)
    }

    /// Gets a record by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(record))` - Record found
    /// * `Ok(None)` - No record with that id
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CalculationRecord>> {
        let row = sqlx::query_as::<_, CalculationRow>(
            r#"
            SELECT id, items, total_items, pack_count, created_at
            FROM calculations
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT calculation_id, pack_size, quantity
            FROM calculation_items
            WHERE calculation_id = ?1
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let breakdown = items
            .into_iter()
            .map(|item| (item.pack_size, item.quantity))
            .collect();

        assemble(row, breakdown).map(Some)
    }

    /// Total number of records in the log.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM calculations")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Joins a header row with its breakdown, checking the two agree.
fn assemble(row: CalculationRow, breakdown: Breakdown) -> DbResult<CalculationRecord> {
    if breakdown.total_items() != row.total_items || breakdown.pack_count() != row.pack_count {
        return Err(DbError::corrupt(
            "calculation",
            format!(
                "{}: breakdown totals {} items in {} packs, header says {} in {}",
                row.id,
                breakdown.total_items(),
                breakdown.pack_count(),
                row.total_items,
                row.pack_count
            ),
        ));
    }

    Ok(CalculationRecord {
        id: row.id,
        items: row.items,
        total_items: row.total_items,
        pack_count: row.pack_count,
        breakdown,
        created_at: row.created_at,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

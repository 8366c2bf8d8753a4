use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::InteractionStore,
    error::{AppError, AppResult},
    models::{
        ActionType, Interaction, NewInteraction, NewProduct, NewRetailer, PopularProduct, Product,
        Retailer, ViewEvent,
    },
};
use chrono::{DateTime, Utc};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the schema in `migrations/`
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

#[derive(sqlx::FromRow)]
struct InteractionRow {
    interaction_id: i64,
    retailer_id: i64,
    product_id: i64,
    action_type: String,
    timestamp: DateTime<Utc>,
}

impl TryFrom<InteractionRow> for Interaction {
    type Error = AppError;

    fn try_from(row: InteractionRow) -> AppResult<Self> {
        let action_type = row.action_type.parse::<ActionType>().map_err(|_| {
            AppError::Internal(format!(
                "Stored interaction {} has unknown action type {}",
                row.interaction_id, row.action_type
            ))
        })?;

        Ok(Interaction {
            interaction_id: row.interaction_id,
            retailer_id: row.retailer_id,
            product_id: row.product_id,
            action_type,
            timestamp: row.timestamp,
        })
    }
}

/// [`InteractionStore`] backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl InteractionStore for PgStore {
    async fn create_retailer(&self, retailer: NewRetailer) -> AppResult<Retailer> {
        let created = sqlx::query_as::<_, Retailer>(
            r#"
            INSERT INTO retailers (name, location, last_login)
            VALUES ($1, $2, $3)
            RETURNING retailer_id, name, location, last_login
            "#,
        )
        .bind(&retailer.name)
        .bind(&retailer.location)
        .bind(retailer.last_login)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn create_product(&self, product: NewProduct) -> AppResult<Product> {
        let created = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, category, brand, price, product_metadata)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING product_id, name, category, brand, price, product_metadata
            "#,
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.brand)
        .bind(product.price)
        .bind(&product.product_metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn create_interaction(&self, interaction: NewInteraction) -> AppResult<Interaction> {
        let row = sqlx::query_as::<_, InteractionRow>(
            r#"
            INSERT INTO interactions (retailer_id, product_id, action_type, timestamp)
            VALUES ($1, $2, $3, $4)
            RETURNING interaction_id, retailer_id, product_id, action_type, timestamp
            "#,
        )
        .bind(interaction.retailer_id)
        .bind(interaction.product_id)
        .bind(interaction.action_type.as_str())
        .bind(interaction.timestamp)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                AppError::NotFound(format!(
                    "Retailer {} or product {} does not exist",
                    interaction.retailer_id, interaction.product_id
                ))
            }
            other => AppError::Database(other),
        })?;

        row.try_into()
    }

    async fn popular_products(
        &self,
        retailer_id: i64,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<PopularProduct>> {
        let rows = sqlx::query_as::<_, PopularProduct>(
            r#"
            SELECT p.product_id, p.name, p.brand, p.category,
                   COUNT(i.interaction_id) AS view_count
            FROM products p
            JOIN interactions i ON p.product_id = i.product_id
            WHERE i.retailer_id = $1 AND i.action_type = $2
            GROUP BY p.product_id, p.name, p.brand, p.category
            ORDER BY view_count DESC, p.product_id ASC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(retailer_id)
        .bind(ActionType::View.as_str())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn view_events(&self) -> AppResult<Vec<ViewEvent>> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT retailer_id, product_id
            FROM interactions
            WHERE action_type = $1
            ORDER BY interaction_id
            "#,
        )
        .bind(ActionType::View.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(retailer_id, product_id)| ViewEvent::new(retailer_id, product_id))
            .collect())
    }

    async fn products_by_ids(&self, product_ids: &[i64]) -> AppResult<Vec<Product>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, Product>(
            r#"
            SELECT product_id, name, category, brand, price, product_metadata
            FROM products
            WHERE product_id = ANY($1)
            "#,
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

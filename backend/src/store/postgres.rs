//! PostgreSQL-backed inventory store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    apply_movement, Customer, MovementKind, NewCustomer, NewMovement, Product, ProductDraft,
    SalesTotal, StockMovement,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{InventoryStore, ReportSnapshot};
use crate::error::{AppError, AppResult};

const PRODUCT_COLUMNS: &str = "id, name, description, category, purchase_price, sale_price, \
     current_stock, minimum_stock, version, created_at, updated_at";

const CUSTOMER_COLUMNS: &str = "id, name, email, phone, created_at";

const MOVEMENT_COLUMNS: &str = "id, product_id, kind, quantity, occurred_at, notes, created_at";

/// Database row for products
#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    category: Option<String>,
    purchase_price: Decimal,
    sale_price: Decimal,
    current_stock: i32,
    minimum_stock: i32,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            category: row.category,
            purchase_price: row.purchase_price,
            sale_price: row.sale_price,
            current_stock: row.current_stock,
            minimum_stock: row.minimum_stock,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Database row for stock movements
#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    product_id: Uuid,
    kind: String,
    quantity: i32,
    occurred_at: DateTime<Utc>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = AppError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let kind = row
            .kind
            .parse::<MovementKind>()
            .map_err(|e| AppError::Internal(format!("movement {}: {}", row.id, e)))?;

        Ok(StockMovement {
            id: row.id,
            product_id: row.product_id,
            kind,
            quantity: row.quantity,
            occurred_at: row.occurred_at,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

/// Database row for customers
#[derive(Debug, FromRow)]
struct CustomerRow {
    id: Uuid,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            created_at: row.created_at,
        }
    }
}

fn into_movements(rows: Vec<MovementRow>) -> AppResult<Vec<StockMovement>> {
    rows.into_iter().map(StockMovement::try_from).collect()
}

fn product_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Product {}", id))
}

/// Inventory store on a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Run pending migrations from `backend/migrations`
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!("./migrations").run(&self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn insert_product(&self, draft: ProductDraft) -> AppResult<Product> {
        let now = Utc::now();

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (id, name, description, category, purchase_price, sale_price,
                                  current_stock, minimum_stock, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 1, $9, $9)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.category)
        .bind(draft.purchase_price)
        .bind(draft.sale_price)
        .bind(draft.current_stock)
        .bind(draft.minimum_stock)
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn list_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name, id"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn update_product(
        &self,
        id: Uuid,
        expected_version: i64,
        draft: ProductDraft,
    ) -> AppResult<Product> {
        let mut tx = self.db.begin().await?;

        let current_version = sqlx::query_scalar::<_, i64>(
            "SELECT version FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| product_not_found(id))?;

        if current_version != expected_version {
            return Err(AppError::Conflict {
                resource: format!("Product {}", id),
                expected_version,
                current_version,
            });
        }

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET name = $1, description = $2, category = $3, purchase_price = $4, sale_price = $5,
                current_stock = $6, minimum_stock = $7, version = version + 1, updated_at = $8
            WHERE id = $9
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.category)
        .bind(draft.purchase_price)
        .bind(draft.sale_price)
        .bind(draft.current_stock)
        .bind(draft.minimum_stock)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn delete_product(&self, id: Uuid) -> AppResult<u64> {
        let mut tx = self.db.begin().await?;

        sqlx::query_scalar::<_, Uuid>("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| product_not_found(id))?;

        let movements = sqlx::query("DELETE FROM stock_movements WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(movements)
    }

    async fn post_movement(&self, movement: NewMovement) -> AppResult<StockMovement> {
        let product_id = movement.product_id;
        let mut tx = self.db.begin().await?;

        // Row lock serializes concurrent postings against the same product
        let current_stock = sqlx::query_scalar::<_, i32>(
            "SELECT current_stock FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| product_not_found(product_id))?;

        let new_stock = apply_movement(current_stock, movement.kind, movement.quantity)
            .map_err(|e| AppError::from_stock(product_id, e))?;

        let now = Utc::now();
        let entry = movement.into_movement(Uuid::new_v4(), now);

        sqlx::query(
            r#"
            UPDATE products
            SET current_stock = $1, version = version + 1, updated_at = $2
            WHERE id = $3
            "#,
        )
        .bind(new_stock)
        .bind(now)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, MovementRow>(&format!(
            r#"
            INSERT INTO stock_movements (id, product_id, kind, quantity, occurred_at, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {MOVEMENT_COLUMNS}
            "#
        ))
        .bind(entry.id)
        .bind(entry.product_id)
        .bind(entry.kind.as_str())
        .bind(entry.quantity)
        .bind(entry.occurred_at)
        .bind(&entry.notes)
        .bind(entry.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        row.try_into()
    }

    async fn get_movement(&self, id: Uuid) -> AppResult<Option<StockMovement>> {
        let row = sqlx::query_as::<_, MovementRow>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(StockMovement::try_from).transpose()
    }

    async fn list_movements(&self) -> AppResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements ORDER BY occurred_at DESC, created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        into_movements(rows)
    }

    async fn list_product_movements(&self, product_id: Uuid) -> AppResult<Vec<StockMovement>> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
        )
        .bind(product_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(product_not_found(product_id));
        }

        let rows = sqlx::query_as::<_, MovementRow>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS} FROM stock_movements
            WHERE product_id = $1
            ORDER BY occurred_at DESC, created_at DESC
            "#
        ))
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        into_movements(rows)
    }

    async fn report_snapshot(&self) -> AppResult<ReportSnapshot> {
        let mut tx = self.db.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let products = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name, id"
        ))
        .fetch_all(&mut *tx)
        .await?;

        let sales = sqlx::query_as::<_, (Uuid, i64)>(
            r#"
            SELECT product_id, SUM(quantity)::BIGINT
            FROM stock_movements
            WHERE kind = 'sale'
            GROUP BY product_id
            ORDER BY product_id
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ReportSnapshot {
            products: products.into_iter().map(Product::from).collect(),
            sales: sales
                .into_iter()
                .map(|(product_id, quantity)| SalesTotal {
                    product_id,
                    quantity,
                })
                .collect(),
        })
    }

    async fn insert_customer(&self, customer: NewCustomer) -> AppResult<Customer> {
        let customer = customer.into_customer(Uuid::new_v4(), Utc::now());

        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r#"
            INSERT INTO customers (id, name, email, phone, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(customer.created_at)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn list_customers(&self) -> AppResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name, id"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }
}

//! Cart repository.
//!
//! Every mutation runs in one transaction: the product row and the cart are
//! locked `FOR UPDATE`, the pure [`Cart`] aggregate is applied, and the
//! resulting stock, line quantity, and total are written back together.
//! Concurrent adds against the same product serialize on the row lock, so
//! stock can never be oversold and no update is lost.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use galeria_core::{CartId, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::{Cart, CartError, CartLine};
use crate::models::product::Product;

/// Outcome of a cart mutation: either the updated cart or a domain
/// rejection (which rolled the transaction back).
pub type CartMutation = Result<Cart, CartError>;

#[derive(sqlx::FromRow)]
struct CartRow {
    id: i32,
    cliente_id: i32,
    total: Decimal,
}

#[derive(sqlx::FromRow)]
struct LineRow {
    producto_id: i32,
    nombre: String,
    precio: Decimal,
    cantidad: i32,
}

#[derive(sqlx::FromRow)]
struct LockedProduct {
    id: i32,
    nombre: String,
    categoria: String,
    stock: i32,
    precio: Decimal,
    imagen: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<LockedProduct> for Product {
    fn from(r: LockedProduct) -> Self {
        Self {
            id: ProductId::new(r.id),
            nombre: r.nombre,
            categoria: r.categoria,
            stock: r.stock,
            precio: r.precio,
            imagen: r.imagen,
            created_at: r.created_at,
        }
    }
}

/// Repository for shopping carts.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the customer's active (unpaid) cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer has no active
    /// cart yet (one is only created lazily on first add).
    pub async fn get_active(&self, cliente_id: UserId) -> Result<Cart, RepositoryError> {
        let row: Option<CartRow> = sqlx::query_as(
            "SELECT id, cliente_id, total FROM carro
             WHERE cliente_id = $1 AND NOT pagado",
        )
        .bind(cliente_id)
        .fetch_optional(self.pool)
        .await?;

        let row = row.ok_or(RepositoryError::NotFound)?;
        let lines = load_lines(self.pool, CartId::new(row.id)).await?;

        let mut cart = Cart {
            id: CartId::new(row.id),
            cliente_id: UserId::new(row.cliente_id),
            lines,
            total: row.total,
        };
        // Catalog prices may have moved since the last mutation; the total
        // always reflects the prices joined in just now.
        cart.recompute_total();

        Ok(cart)
    }

    /// Add `cantidad` units of a product to the customer's cart, creating
    /// the cart on first use.
    ///
    /// On a domain rejection (`InsufficientStock`, `InvalidQuantity`) the
    /// transaction is rolled back and `Ok(Err(_))` is returned: stock,
    /// lines, and total are untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn add_line(
        &self,
        cliente_id: UserId,
        producto_id: ProductId,
        cantidad: i32,
    ) -> Result<CartMutation, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let mut product = lock_product(&mut tx, producto_id).await?;
        let mut cart = lock_or_create_cart(&mut tx, cliente_id).await?;

        if let Err(e) = cart.add_line(&mut product, cantidad) {
            tx.rollback().await?;
            return Ok(Err(e));
        }

        sqlx::query("UPDATE producto SET stock = $2 WHERE id = $1")
            .bind(product.id)
            .bind(product.stock)
            .execute(&mut *tx)
            .await?;

        let line_qty = cart
            .line(producto_id)
            .map_or(0, |l| l.cantidad);
        sqlx::query(
            "INSERT INTO carro_producto (carro_id, producto_id, cantidad)
             VALUES ($1, $2, $3)
             ON CONFLICT (carro_id, producto_id)
             DO UPDATE SET cantidad = EXCLUDED.cantidad",
        )
        .bind(cart.id)
        .bind(producto_id)
        .bind(line_qty)
        .execute(&mut *tx)
        .await?;

        persist_total(&mut tx, &cart).await?;
        tx.commit().await?;

        Ok(Ok(cart))
    }

    /// Remove the product's line from the customer's cart, restoring its
    /// quantity onto the product's stock. Removing an absent line (or
    /// removing from a customer with no cart) is a silent no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn remove_line(
        &self,
        cliente_id: UserId,
        producto_id: ProductId,
    ) -> Result<Option<Cart>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let mut product = lock_product(&mut tx, producto_id).await?;

        let Some(mut cart) = lock_cart(&mut tx, cliente_id).await? else {
            tx.rollback().await?;
            return Ok(None);
        };

        if cart.line(producto_id).is_none() {
            tx.rollback().await?;
            return Ok(Some(cart));
        }

        cart.remove_line(&mut product);

        sqlx::query("UPDATE producto SET stock = $2 WHERE id = $1")
            .bind(product.id)
            .bind(product.stock)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM carro_producto WHERE carro_id = $1 AND producto_id = $2")
            .bind(cart.id)
            .bind(producto_id)
            .execute(&mut *tx)
            .await?;

        persist_total(&mut tx, &cart).await?;
        tx.commit().await?;

        Ok(Some(cart))
    }
}

/// Lock a product row for the duration of the transaction.
async fn lock_product(
    tx: &mut Transaction<'_, Postgres>,
    producto_id: ProductId,
) -> Result<Product, RepositoryError> {
    let row: Option<LockedProduct> = sqlx::query_as(
        "SELECT id, nombre, categoria, stock, precio, imagen, created_at
         FROM producto
         WHERE id = $1
         FOR UPDATE",
    )
    .bind(producto_id)
    .fetch_optional(&mut **tx)
    .await?;

    row.map(Product::from).ok_or(RepositoryError::NotFound)
}

/// Lock the customer's active cart, or return `None` if they have none.
async fn lock_cart(
    tx: &mut Transaction<'_, Postgres>,
    cliente_id: UserId,
) -> Result<Option<Cart>, RepositoryError> {
    let row: Option<CartRow> = sqlx::query_as(
        "SELECT id, cliente_id, total FROM carro
         WHERE cliente_id = $1 AND NOT pagado
         FOR UPDATE",
    )
    .bind(cliente_id)
    .fetch_optional(&mut **tx)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let lines = load_lines_tx(tx, CartId::new(row.id)).await?;

    let mut cart = Cart {
        id: CartId::new(row.id),
        cliente_id: UserId::new(row.cliente_id),
        lines,
        total: row.total,
    };
    cart.recompute_total();

    Ok(Some(cart))
}

/// Lock the customer's active cart, creating it if this is their first add.
async fn lock_or_create_cart(
    tx: &mut Transaction<'_, Postgres>,
    cliente_id: UserId,
) -> Result<Cart, RepositoryError> {
    if let Some(cart) = lock_cart(tx, cliente_id).await? {
        return Ok(cart);
    }

    // The partial unique index on (cliente_id) WHERE NOT pagado makes a
    // concurrent double-create fail; the loser retries the lookup.
    let created: Result<CartRow, sqlx::Error> =
        sqlx::query_as("INSERT INTO carro (cliente_id) VALUES ($1) RETURNING id, cliente_id, total")
            .bind(cliente_id)
            .fetch_one(&mut **tx)
            .await;

    match created {
        Ok(row) => Ok(Cart::new(CartId::new(row.id), UserId::new(row.cliente_id))),
        Err(e) => {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                lock_cart(tx, cliente_id)
                    .await?
                    .ok_or(RepositoryError::NotFound)
            } else {
                Err(RepositoryError::Database(e))
            }
        }
    }
}

async fn load_lines_tx(
    tx: &mut Transaction<'_, Postgres>,
    carro_id: CartId,
) -> Result<Vec<CartLine>, RepositoryError> {
    let rows: Vec<LineRow> = sqlx::query_as(LINES_QUERY)
        .bind(carro_id)
        .fetch_all(&mut **tx)
        .await?;

    Ok(rows.into_iter().map(line_from_row).collect())
}

async fn load_lines(pool: &PgPool, carro_id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
    let rows: Vec<LineRow> = sqlx::query_as(LINES_QUERY)
        .bind(carro_id)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(line_from_row).collect())
}

// Lines always join the current catalog price so totals are evaluated at
// call time, not snapshotted at add time.
const LINES_QUERY: &str = "SELECT cp.producto_id, p.nombre, p.precio, cp.cantidad
     FROM carro_producto cp
     JOIN producto p ON p.id = cp.producto_id
     WHERE cp.carro_id = $1
     ORDER BY cp.id";

fn line_from_row(r: LineRow) -> CartLine {
    CartLine {
        producto_id: ProductId::new(r.producto_id),
        nombre: r.nombre,
        precio: r.precio,
        cantidad: r.cantidad,
    }
}

async fn persist_total(
    tx: &mut Transaction<'_, Postgres>,
    cart: &Cart,
) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE carro SET total = $2 WHERE id = $1")
        .bind(cart.id)
        .bind(cart.total)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

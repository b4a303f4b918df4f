//! Product Storage
//! Mission: CRUD and filtered search over product records with SQLite

use crate::catalog::models::{NewProduct, Product, ProductUpdate};
use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, Connection, ToSql};
use tracing::{debug, info};

/// Defaults applied when pagination parameters are omitted
pub const DEFAULT_SKIP: i64 = 0;
pub const DEFAULT_LIMIT: i64 = 10;

/// Product storage with SQLite backend
///
/// Like [`crate::auth::UserStore`], each operation opens a short-lived
/// connection: open, read/write, close on every exit path. No upper bound is
/// enforced on `limit` (a large value scans the whole table - known gap).
pub struct ProductStore {
    db_path: String,
}

impl ProductStore {
    /// Create a new product store and initialize the schema
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                price REAL NOT NULL,
                sizes TEXT NOT NULL,
                colors TEXT NOT NULL,
                category TEXT NOT NULL,
                stock INTEGER NOT NULL,
                image_url TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_products_category ON products(category);",
        )
        .context("Failed to create products table")?;

        Ok(())
    }

    /// Insert a new product and return it with its server-assigned id
    pub fn create(&self, new: &NewProduct) -> Result<Product> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "INSERT INTO products (name, description, price, sizes, colors, category, stock, image_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                new.name,
                new.description,
                new.price,
                new.sizes,
                new.colors,
                new.category,
                new.stock,
                new.image_url,
            ],
        )
        .context("Failed to insert product")?;

        let id = conn.last_insert_rowid();
        info!("📦 Created product {} ({})", id, new.name);

        Ok(Product {
            id,
            name: new.name.clone(),
            description: new.description.clone(),
            price: new.price,
            sizes: new.sizes.clone(),
            colors: new.colors.clone(),
            category: new.category.clone(),
            stock: new.stock,
            image_url: new.image_url.clone(),
        })
    }

    /// Get a product by id
    pub fn get(&self, id: i64) -> Result<Option<Product>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, name, description, price, sizes, colors, category, stock, image_url
             FROM products WHERE id = ?1",
        )?;

        match stmt.query_row(params![id], Self::row_to_product) {
            Ok(product) => Ok(Some(product)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List a page of products; count is the page length
    pub fn list(&self, skip: i64, limit: i64) -> Result<(usize, Vec<Product>)> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, name, description, price, sizes, colors, category, stock, image_url
             FROM products ORDER BY id LIMIT ?1 OFFSET ?2",
        )?;

        let products: Vec<Product> = stmt
            .query_map(params![limit, skip], Self::row_to_product)?
            .collect::<std::result::Result<_, _>>()?;

        Ok((products.len(), products))
    }

    /// Search products with optional case-insensitive substring filters
    ///
    /// All supplied filters AND together in a single query and `skip`/`limit`
    /// apply once to the combined result.
    pub fn search(
        &self,
        skip: i64,
        limit: i64,
        name: Option<&str>,
        description: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<Product>> {
        let conn = Connection::open(&self.db_path)?;

        let mut sql = String::from(
            "SELECT id, name, description, price, sizes, colors, category, stock, image_url
             FROM products",
        );

        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        for (column, filter) in [
            ("name", name),
            ("description", description),
            ("category", category),
        ] {
            if let Some(needle) = filter {
                clauses.push(format!("LOWER({}) LIKE ?", column));
                values.push(Box::new(format!("%{}%", needle.to_lowercase())));
            }
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id LIMIT ? OFFSET ?");
        values.push(Box::new(limit));
        values.push(Box::new(skip));

        debug!("🔎 Product search: {} filter(s)", clauses.len());

        let mut stmt = conn.prepare(&sql)?;
        let products: Vec<Product> = stmt
            .query_map(
                params_from_iter(values.iter().map(|v| v.as_ref())),
                Self::row_to_product,
            )?
            .collect::<std::result::Result<_, _>>()?;

        Ok(products)
    }

    /// Apply a partial update; `None` when the id is absent
    pub fn update(&self, id: i64, update: &ProductUpdate) -> Result<Option<Product>> {
        let Some(mut product) = self.get(id)? else {
            return Ok(None);
        };

        update.apply(&mut product);

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "UPDATE products
             SET name = ?1, description = ?2, price = ?3, sizes = ?4,
                 colors = ?5, category = ?6, stock = ?7, image_url = ?8
             WHERE id = ?9",
            params![
                product.name,
                product.description,
                product.price,
                product.sizes,
                product.colors,
                product.category,
                product.stock,
                product.image_url,
                id,
            ],
        )
        .context("Failed to update product")?;

        info!("📦 Updated product {}", id);
        Ok(Some(product))
    }

    /// Delete a product row; false when absent. The image asset on disk is
    /// left behind (no garbage collection).
    pub fn delete(&self, id: i64) -> Result<bool> {
        let conn = Connection::open(&self.db_path)?;

        let rows_affected = conn
            .execute("DELETE FROM products WHERE id = ?1", params![id])
            .context("Failed to delete product")?;

        if rows_affected > 0 {
            info!("🗑️  Deleted product {}", id);
        }

        Ok(rows_affected > 0)
    }

    fn row_to_product(row: &rusqlite::Row) -> rusqlite::Result<Product> {
        Ok(Product {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            price: row.get(3)?,
            sizes: row.get(4)?,
            colors: row.get(5)?,
            category: row.get(6)?,
            stock: row.get(7)?,
            image_url: row.get(8)?,
        })
    }
}

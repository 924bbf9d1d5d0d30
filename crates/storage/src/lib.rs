use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::{
    domain::{
        store_slug, ActiveStatus, BusinessType, CatalogItem, Customer, ItemId, ItemKind,
        NotificationPrefs, Order, OrderId, OrderLine, OrderStatus, Role, SocialLinks, StoreId,
        StoreProfile, UserId, UserSummary,
    },
    protocol::ItemDraft,
    schedule::WeeklySchedule,
};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredUser {
    pub summary: UserSummary,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub whatsapp: &'a str,
    pub password_hash: &'a str,
    pub store_name: &'a str,
    pub role: Role,
    pub status: ActiveStatus,
}

/// The store opened together with a seller account.
#[derive(Debug, Clone)]
pub struct NewStore<'a> {
    pub name: &'a str,
    pub whatsapp: &'a str,
    pub email: &'a str,
    pub category: &'a str,
    pub business_type: BusinessType,
    pub schedule: WeeklySchedule,
}

const USER_COLUMNS: &str = "id, full_name, email, whatsapp, password_hash, store_name, role, status, notify_email, notify_whatsapp, registered_at";

const STORE_COLUMNS: &str = "s.id, s.owner_user_id, u.full_name AS owner_name, s.name, s.slug, s.description, s.address, s.whatsapp, s.email, s.category, s.business_type, s.schedule_json, s.logo_url, s.facebook_url, s.instagram_url, s.status, s.created_at";

const ITEM_COLUMNS: &str = "id, store_id, name, description, unit_price, image_url, category, kind, stock, duration, is_active, created_at";

const ORDER_COLUMNS: &str = "id, store_id, customer_name, customer_email, customer_phone, shipping_address, notes, status, total, created_at";

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        // Every connection to `:memory:` is a separate database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn create_user(&self, user: NewUser<'_>) -> Result<UserId> {
        let mut conn = self.pool.acquire().await?;
        insert_user(&mut conn, &user).await
    }

    /// Inserts a seller and their store in one transaction, so a failed store
    /// insert leaves no orphan account behind.
    pub async fn create_seller(
        &self,
        user: NewUser<'_>,
        store: NewStore<'_>,
    ) -> Result<(UserId, StoreId)> {
        let mut tx = self.pool.begin().await?;
        let user_id = insert_user(&mut tx, &user).await?;
        let store_id = insert_store(&mut tx, user_id, &store).await?;
        tx.commit().await?;
        Ok((user_id, store_id))
    }

    pub async fn user_by_id(&self, user_id: UserId) -> Result<Option<StoredUser>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(stored_user_from_row).transpose()
    }

    pub async fn user_by_whatsapp(&self, whatsapp: &str) -> Result<Option<StoredUser>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE whatsapp = ?"
        ))
        .bind(whatsapp)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(stored_user_from_row).transpose()
    }

    pub async fn list_users(&self) -> Result<Vec<UserSummary>> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| stored_user_from_row(row).map(|u| u.summary))
            .collect()
    }

    /// Persists every mutable field of `user`; returns false when the id is unknown.
    pub async fn save_user(&self, user: &UserSummary) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users
             SET full_name = ?, email = ?, whatsapp = ?, store_name = ?, role = ?, status = ?,
                 notify_email = ?, notify_whatsapp = ?
             WHERE id = ?",
        )
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.whatsapp)
        .bind(&user.store_name)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(user.notifications.email)
        .bind(user.notifications.whatsapp)
        .bind(user.user_id.0)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to update user {}", user.user_id))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn store_by_id(&self, store_id: StoreId) -> Result<Option<StoreProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {STORE_COLUMNS} FROM stores s INNER JOIN users u ON u.id = s.owner_user_id WHERE s.id = ?"
        ))
        .bind(store_id.0)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(store_from_row).transpose()
    }

    pub async fn store_by_slug(&self, slug: &str) -> Result<Option<StoreProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {STORE_COLUMNS} FROM stores s INNER JOIN users u ON u.id = s.owner_user_id WHERE s.slug = ?"
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(store_from_row).transpose()
    }

    pub async fn store_for_owner(&self, owner_user_id: UserId) -> Result<Option<StoreProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {STORE_COLUMNS} FROM stores s INNER JOIN users u ON u.id = s.owner_user_id
             WHERE s.owner_user_id = ? ORDER BY s.id ASC LIMIT 1"
        ))
        .bind(owner_user_id.0)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(store_from_row).transpose()
    }

    /// Newest stores first.
    pub async fn list_stores(&self) -> Result<Vec<StoreProfile>> {
        let rows = sqlx::query(&format!(
            "SELECT {STORE_COLUMNS} FROM stores s INNER JOIN users u ON u.id = s.owner_user_id
             ORDER BY s.created_at DESC, s.id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(store_from_row).collect()
    }

    pub async fn save_store(&self, store: &StoreProfile) -> Result<bool> {
        let Some(current) = self.store_by_id(store.store_id).await? else {
            return Ok(false);
        };
        let slug = if current.slug == store.slug {
            store.slug.clone()
        } else {
            let mut conn = self.pool.acquire().await?;
            unique_slug(&mut conn, &store.slug).await?
        };
        let result = sqlx::query(
            "UPDATE stores
             SET name = ?, slug = ?, description = ?, address = ?, whatsapp = ?, email = ?,
                 category = ?, business_type = ?, schedule_json = ?, logo_url = ?,
                 facebook_url = ?, instagram_url = ?, status = ?
             WHERE id = ?",
        )
        .bind(&store.name)
        .bind(&slug)
        .bind(&store.description)
        .bind(&store.address)
        .bind(&store.whatsapp)
        .bind(&store.email)
        .bind(&store.category)
        .bind(store.business_type.as_str())
        .bind(serde_json::to_string(&store.schedule)?)
        .bind(store.logo_url.as_deref())
        .bind(store.social.facebook.as_deref())
        .bind(store.social.instagram.as_deref())
        .bind(store.status.as_str())
        .bind(store.store_id.0)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to update store {}", store.store_id))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn create_item(&self, store_id: StoreId, draft: &ItemDraft) -> Result<ItemId> {
        let rec = sqlx::query(
            "INSERT INTO items (store_id, name, description, unit_price, image_url, category, kind, stock, duration, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?)
             RETURNING id",
        )
        .bind(store_id.0)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.unit_price.to_string())
        .bind(draft.image_url.as_deref())
        .bind(&draft.category)
        .bind(draft.kind.as_str())
        .bind(draft.stock.map(i64::from))
        .bind(draft.duration.as_deref())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("failed to insert item into store {store_id}"))?;
        Ok(ItemId(rec.get::<i64, _>(0)))
    }

    pub async fn item_by_id(&self, item_id: ItemId) -> Result<Option<CatalogItem>> {
        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?"))
            .bind(item_id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(item_from_row).transpose()
    }

    pub async fn list_items(&self, store_id: StoreId) -> Result<Vec<CatalogItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE store_id = ? ORDER BY id ASC"
        ))
        .bind(store_id.0)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(item_from_row).collect()
    }

    pub async fn save_item(&self, item: &CatalogItem) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE items
             SET name = ?, description = ?, unit_price = ?, image_url = ?, category = ?,
                 kind = ?, stock = ?, duration = ?, is_active = ?
             WHERE id = ?",
        )
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.unit_price.to_string())
        .bind(item.image_url.as_deref())
        .bind(&item.category)
        .bind(item.kind.as_str())
        .bind(item.stock.map(i64::from))
        .bind(item.duration.as_deref())
        .bind(item.is_active)
        .bind(item.item_id.0)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to update item {}", item.item_id))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_item(&self, item_id: ItemId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(item_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn create_order(
        &self,
        store_id: StoreId,
        customer: &Customer,
        lines: &[OrderLine],
        total: Decimal,
        notes: Option<&str>,
    ) -> Result<OrderId> {
        let mut tx = self.pool.begin().await?;
        let rec = sqlx::query(
            "INSERT INTO orders (store_id, customer_name, customer_email, customer_phone, shipping_address, notes, status, total, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(store_id.0)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(customer.shipping_address.as_deref())
        .bind(notes)
        .bind(OrderStatus::Pending.as_str())
        .bind(total.to_string())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .with_context(|| format!("failed to insert order for store {store_id}"))?;
        let order_id = OrderId(rec.get::<i64, _>(0));

        for (position, line) in lines.iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_lines (order_id, position, name, quantity, unit_price)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(order_id.0)
            .bind(position as i64)
            .bind(&line.name)
            .bind(i64::from(line.quantity))
            .bind(line.unit_price.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order_id)
    }

    pub async fn order_by_id(&self, order_id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"))
            .bind(order_id.0)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => {
                let lines = self.order_lines(order_id).await?;
                Ok(Some(order_from_row(&row, lines)?))
            }
            None => Ok(None),
        }
    }

    /// Newest orders first.
    pub async fn list_orders(&self, store_id: StoreId) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE store_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(store_id.0)
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let order_id = OrderId(row.try_get("id")?);
            let lines = self.order_lines(order_id).await?;
            orders.push(order_from_row(&row, lines)?);
        }
        Ok(orders)
    }

    async fn order_lines(&self, order_id: OrderId) -> Result<Vec<OrderLine>> {
        let rows = sqlx::query(
            "SELECT name, quantity, unit_price FROM order_lines WHERE order_id = ? ORDER BY position ASC",
        )
        .bind(order_id.0)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| -> Result<OrderLine> {
                Ok(OrderLine {
                    name: row.try_get("name")?,
                    quantity: u32::try_from(row.try_get::<i64, _>("quantity")?)
                        .context("order line quantity out of range")?,
                    unit_price: decimal_column(row, "unit_price")?,
                })
            })
            .collect()
    }

    pub async fn set_order_status(&self, order_id: OrderId, status: OrderStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(order_id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Sum of completed order totals across every store.
    pub async fn completed_revenue(&self) -> Result<Decimal> {
        let totals: Vec<String> = sqlx::query_scalar("SELECT total FROM orders WHERE status = ?")
            .bind(OrderStatus::Completed.as_str())
            .fetch_all(&self.pool)
            .await?;
        totals
            .iter()
            .map(|raw| parse_decimal(raw))
            .sum::<Result<Decimal>>()
    }
}

/// True when `err` was caused by a UNIQUE constraint, such as a WhatsApp
/// number registered twice.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| match cause.downcast_ref::<sqlx::Error>() {
            Some(sqlx::Error::Database(db)) => db.is_unique_violation(),
            _ => false,
        })
}

async fn insert_user(conn: &mut SqliteConnection, user: &NewUser<'_>) -> Result<UserId> {
    let rec = sqlx::query(
        "INSERT INTO users (full_name, email, whatsapp, password_hash, store_name, role, status, registered_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING id",
    )
    .bind(user.full_name)
    .bind(user.email)
    .bind(user.whatsapp)
    .bind(user.password_hash)
    .bind(user.store_name)
    .bind(user.role.as_str())
    .bind(user.status.as_str())
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await
    .with_context(|| format!("failed to insert user with whatsapp '{}'", user.whatsapp))?;
    Ok(UserId(rec.get::<i64, _>(0)))
}

async fn insert_store(
    conn: &mut SqliteConnection,
    owner_user_id: UserId,
    store: &NewStore<'_>,
) -> Result<StoreId> {
    let slug = unique_slug(conn, &store_slug(store.name)).await?;
    let schedule_json = serde_json::to_string(&store.schedule)?;
    let rec = sqlx::query(
        "INSERT INTO stores (owner_user_id, name, slug, whatsapp, email, category, business_type, schedule_json, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING id",
    )
    .bind(owner_user_id.0)
    .bind(store.name)
    .bind(&slug)
    .bind(store.whatsapp)
    .bind(store.email)
    .bind(store.category)
    .bind(store.business_type.as_str())
    .bind(schedule_json)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await
    .with_context(|| format!("failed to insert store '{}'", store.name))?;
    Ok(StoreId(rec.get::<i64, _>(0)))
}

async fn unique_slug(conn: &mut SqliteConnection, base: &str) -> Result<String> {
    let base = if base.is_empty() { "tienda" } else { base };
    let mut candidate = base.to_string();
    let mut suffix = 2;
    while slug_taken(conn, &candidate).await? {
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
    Ok(candidate)
}

async fn slug_taken(conn: &mut SqliteConnection, slug: &str) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stores WHERE slug = ?")
        .bind(slug)
        .fetch_one(&mut *conn)
        .await?;
    Ok(count > 0)
}

fn parse_decimal(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).with_context(|| format!("invalid decimal '{raw}' in database"))
}

fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal> {
    let raw: String = row.try_get(column)?;
    parse_decimal(&raw)
}

fn enum_column<T>(row: &SqliteRow, column: &str, parse: fn(&str) -> Option<T>) -> Result<T> {
    let raw: String = row.try_get(column)?;
    parse(&raw).ok_or_else(|| anyhow!("unexpected value '{raw}' in column {column}"))
}

fn stored_user_from_row(row: &SqliteRow) -> Result<StoredUser> {
    Ok(StoredUser {
        summary: UserSummary {
            user_id: UserId(row.try_get("id")?),
            full_name: row.try_get("full_name")?,
            email: row.try_get("email")?,
            whatsapp: row.try_get("whatsapp")?,
            store_name: row.try_get("store_name")?,
            role: enum_column(row, "role", Role::parse)?,
            status: enum_column(row, "status", ActiveStatus::parse)?,
            notifications: NotificationPrefs {
                email: row.try_get("notify_email")?,
                whatsapp: row.try_get("notify_whatsapp")?,
            },
            registered_at: row.try_get::<DateTime<Utc>, _>("registered_at")?,
        },
        password_hash: row.try_get("password_hash")?,
    })
}

fn store_from_row(row: &SqliteRow) -> Result<StoreProfile> {
    let schedule_json: String = row.try_get("schedule_json")?;
    let schedule: WeeklySchedule =
        serde_json::from_str(&schedule_json).context("invalid store schedule json")?;
    Ok(StoreProfile {
        store_id: StoreId(row.try_get("id")?),
        owner_user_id: UserId(row.try_get("owner_user_id")?),
        owner_name: row.try_get("owner_name")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
        address: row.try_get("address")?,
        whatsapp: row.try_get("whatsapp")?,
        email: row.try_get("email")?,
        category: row.try_get("category")?,
        business_type: enum_column(row, "business_type", BusinessType::parse)?,
        schedule,
        logo_url: row.try_get("logo_url")?,
        social: SocialLinks {
            facebook: row.try_get("facebook_url")?,
            instagram: row.try_get("instagram_url")?,
        },
        status: enum_column(row, "status", ActiveStatus::parse)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn item_from_row(row: &SqliteRow) -> Result<CatalogItem> {
    let stock = row
        .try_get::<Option<i64>, _>("stock")?
        .map(u32::try_from)
        .transpose()
        .context("item stock out of range")?;
    Ok(CatalogItem {
        item_id: ItemId(row.try_get("id")?),
        store_id: StoreId(row.try_get("store_id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        unit_price: decimal_column(row, "unit_price")?,
        image_url: row.try_get("image_url")?,
        category: row.try_get("category")?,
        kind: enum_column(row, "kind", ItemKind::parse)?,
        stock,
        duration: row.try_get("duration")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn order_from_row(row: &SqliteRow, lines: Vec<OrderLine>) -> Result<Order> {
    Ok(Order {
        order_id: OrderId(row.try_get("id")?),
        store_id: StoreId(row.try_get("store_id")?),
        customer: Customer {
            name: row.try_get("customer_name")?,
            email: row.try_get("customer_email")?,
            phone: row.try_get("customer_phone")?,
            shipping_address: row.try_get("shipping_address")?,
        },
        lines,
        status: enum_column(row, "status", OrderStatus::parse)?,
        total: decimal_column(row, "total")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.contains(":memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

use async_trait::async_trait;
use common::{
    NewProduct, NewTicket, NewUser, Product, ProductChanges, ProductId, Ticket, TicketChanges,
    TicketId, TicketStatus, User, UserChanges, UserId,
};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};

use crate::{
    Page, PageRequest, Result, StoreError, TicketFilter,
    repository::{Ping, ProductRepository, TicketRepository, UserRepository},
};

const TICKET_COLUMNS: &str = "id, title, description, priority, status, due_date, assignee_id, \
                              created_by, created_at, updated_at";
const PRODUCT_COLUMNS: &str =
    "id, name, description, price, category, stock, is_active, created_at, updated_at";
const USER_COLUMNS: &str = "id, username, email, password_hash, full_name, role, is_active, \
                            last_login_at, created_at, updated_at";

/// PostgreSQL-backed repositories.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::debug!("database migrations applied");
        Ok(())
    }

    fn row_to_ticket(row: PgRow) -> Result<Ticket> {
        Ok(Ticket {
            id: TicketId::new(row.try_get("id")?),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            priority: row.try_get::<String, _>("priority")?.parse()?,
            status: row.try_get::<String, _>("status")?.parse()?,
            due_date: row.try_get("due_date")?,
            assignee_id: row.try_get::<Option<i64>, _>("assignee_id")?.map(UserId::new),
            created_by: row.try_get::<Option<i64>, _>("created_by")?.map(UserId::new),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            category: row.try_get("category")?,
            stock: row.try_get("stock")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn row_to_user(row: PgRow) -> Result<User> {
        Ok(User {
            id: UserId::new(row.try_get("id")?),
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            full_name: row.try_get("full_name")?,
            role: row.try_get::<String, _>("role")?.parse()?,
            is_active: row.try_get("is_active")?,
            last_login_at: row.try_get("last_login_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Maps unique violations on the users table to [`StoreError::Conflict`].
fn map_user_write_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e {
        let field = match db_err.constraint() {
            Some("users_username_key") => Some("username"),
            Some("users_email_key") => Some("email"),
            _ => None,
        };
        if let Some(field) = field {
            tracing::debug!(field, "unique constraint violated");
            return StoreError::Conflict {
                entity: "User",
                field,
            };
        }
    }
    StoreError::Database(e)
}

fn ticket_sort_column(sort_by: &str) -> &'static str {
    match sort_by {
        "title" => "title",
        "priority" => "priority",
        "status" => "status",
        "dueDate" => "due_date",
        "updatedAt" => "updated_at",
        "id" => "id",
        _ => "created_at",
    }
}

fn product_sort_column(sort_by: &str) -> &'static str {
    match sort_by {
        "name" => "name",
        "price" => "price",
        "stock" => "stock",
        "category" => "category",
        "updatedAt" => "updated_at",
        "id" => "id",
        _ => "created_at",
    }
}

fn user_sort_column(sort_by: &str) -> &'static str {
    match sort_by {
        "username" => "username",
        "email" => "email",
        "updatedAt" => "updated_at",
        "id" => "id",
        _ => "created_at",
    }
}

fn escape_like(pattern: &str) -> String {
    pattern
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn push_ticket_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &TicketFilter) {
    qb.push(" WHERE TRUE");
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(priority) = filter.priority {
        qb.push(" AND priority = ").push_bind(priority.as_str());
    }
    if let Some(assignee) = filter.assignee_id {
        qb.push(" AND assignee_id = ").push_bind(assignee.as_i64());
    }
    if let Some(ref title) = filter.title {
        qb.push(" AND title ILIKE ")
            .push_bind(format!("%{}%", escape_like(title)));
    }
    if let Some(from) = filter.from_date {
        qb.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to_date {
        qb.push(" AND created_at <= ").push_bind(to);
    }
}

fn push_page(qb: &mut QueryBuilder<'_, Postgres>, column: &'static str, page: &PageRequest) {
    let order = page.sort_order.as_sql();
    qb.push(format!(" ORDER BY {column} {order}, id {order}"));
    qb.push(" LIMIT ")
        .push_bind(i64::from(page.limit))
        .push(" OFFSET ")
        .push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
}

async fn count_rows(pool: &PgPool, table: &'static str) -> Result<u64> {
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await?;
    Ok(count as u64)
}

#[async_trait]
impl TicketRepository for PostgresStore {
    async fn find_all_tickets(&self, filter: &TicketFilter, page: &PageRequest) -> Result<Page<Ticket>> {
        let total = self.count_tickets(filter).await?;

        let mut qb = QueryBuilder::new(format!("SELECT {TICKET_COLUMNS} FROM tickets"));
        push_ticket_filter(&mut qb, filter);
        push_page(&mut qb, ticket_sort_column(&page.sort_by), page);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let tickets = rows
            .into_iter()
            .map(Self::row_to_ticket)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(tickets, total, page))
    }

    async fn find_ticket(&self, id: TicketId) -> Result<Option<Ticket>> {
        let row = sqlx::query(&format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_ticket).transpose()
    }

    async fn create_ticket(&self, ticket: NewTicket) -> Result<Ticket> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO tickets (title, description, priority, status, due_date, assignee_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TICKET_COLUMNS}
            "#
        ))
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.priority.as_str())
        .bind(ticket.status.as_str())
        .bind(ticket.due_date)
        .bind(ticket.assignee_id.map(|id| id.as_i64()))
        .bind(ticket.created_by.map(|id| id.as_i64()))
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_ticket(row)
    }

    async fn update_ticket(&self, id: TicketId, changes: TicketChanges) -> Result<Option<Ticket>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE tickets SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                priority = COALESCE($4, priority),
                status = COALESCE($5, status),
                due_date = COALESCE($6, due_date),
                assignee_id = COALESCE($7, assignee_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TICKET_COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.priority.map(|p| p.as_str()))
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.due_date)
        .bind(changes.assignee_id.map(|u| u.as_i64()))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_ticket).transpose()
    }

    async fn delete_ticket(&self, id: TicketId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn assign_ticket(&self, id: TicketId, user_id: UserId) -> Result<Option<Ticket>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE tickets SET assignee_id = $2, status = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {TICKET_COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .bind(user_id.as_i64())
        .bind(TicketStatus::Assigned.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_ticket).transpose()
    }

    async fn count_tickets(&self, filter: &TicketFilter) -> Result<u64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM tickets");
        push_ticket_filter(&mut qb, filter);
        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count as u64)
    }
}

#[async_trait]
impl ProductRepository for PostgresStore {
    async fn find_all_products(&self, page: &PageRequest) -> Result<Page<Product>> {
        let total = self.count_products().await?;

        let mut qb = QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
        push_page(&mut qb, product_sort_column(&page.sort_by), page);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let products = rows
            .into_iter()
            .map(Self::row_to_product)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(products, total, page))
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products (name, description, price, category, stock, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.category)
        .bind(product.stock)
        .bind(product.is_active)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_product(row)
    }

    async fn update_product(&self, id: ProductId, changes: ProductChanges) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                category = COALESCE($5, category),
                stock = COALESCE($6, stock),
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .bind(changes.name)
        .bind(changes.description)
        .bind(changes.price)
        .bind(changes.category)
        .bind(changes.stock)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_products(&self) -> Result<u64> {
        count_rows(&self.pool, "products").await
    }
}

#[async_trait]
impl UserRepository for PostgresStore {
    async fn find_all_users(&self, page: &PageRequest) -> Result<Page<User>> {
        let total = self.count_users().await?;

        let mut qb = QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"));
        push_page(&mut qb, user_sort_column(&page.sort_by), page);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let users = rows
            .into_iter()
            .map(Self::row_to_user)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(users, total, page))
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, full_name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_write_error)?;

        Self::row_to_user(row)
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                full_name = COALESCE($5, full_name),
                role = COALESCE($6, role),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .bind(changes.username)
        .bind(changes.email)
        .bind(changes.password_hash)
        .bind(changes.full_name)
        .bind(changes.role.map(|r| r.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_write_error)?;

        row.map(Self::row_to_user).transpose()
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_users(&self) -> Result<u64> {
        count_rows(&self.pool, "users").await
    }

    async fn record_login(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users SET last_login_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }
}

#[async_trait]
impl Ping for PostgresStore {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_columns_are_whitelisted() {
        assert_eq!(ticket_sort_column("dueDate"), "due_date");
        assert_eq!(ticket_sort_column("id; DROP TABLE tickets"), "created_at");
        assert_eq!(product_sort_column("price"), "price");
        assert_eq!(user_sort_column("password_hash"), "created_at");
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn ticket_filter_builds_bound_predicates() {
        let filter = TicketFilter::new()
            .status(TicketStatus::Open)
            .title_contains("vpn");
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tickets");
        push_ticket_filter(&mut qb, &filter);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM tickets WHERE TRUE AND status = $1 AND title ILIKE $2"
        );
    }
}

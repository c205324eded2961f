use chrono::{DateTime, Utc};
use sqlx::{query, query_as, SqliteConnection};

use crate::model::Todo;

/// Source of the current time for `created_at` / `updated_at`.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// UTC, second precision, `Z` suffix
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// CRUD statements against the `todos` table over one borrowed connection.
///
/// Every statement runs in SQLite's autocommit mode, so each operation is its
/// own transaction and is durable once it returns.
pub struct TodoRepository<'c> {
    conn: &'c mut SqliteConnection,
    clock: &'c dyn Clock,
}

impl<'c> TodoRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection, clock: &'c dyn Clock) -> Self {
        Self { conn, clock }
    }

    fn now(&self) -> String {
        format_timestamp(self.clock.now())
    }

    pub async fn list_all(&mut self) -> Result<Vec<Todo>, sqlx::Error> {
        query_as::<_, Todo>(
            "SELECT id, task, done, created_at, updated_at FROM todos ORDER BY id ASC",
        )
        .fetch_all(&mut *self.conn)
        .await
    }

    pub async fn get(&mut self, id: i64) -> Result<Option<Todo>, sqlx::Error> {
        query_as::<_, Todo>(
            "SELECT id, task, done, created_at, updated_at FROM todos WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await
    }

    pub async fn create(&mut self, task: &str) -> Result<i64, sqlx::Error> {
        let now = self.now();
        let result = query(
            "INSERT INTO todos (task, done, created_at, updated_at) VALUES (?, 0, ?, ?)",
        )
        .bind(task)
        .bind(&now)
        .bind(&now)
        .execute(&mut *self.conn)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!(id, "created todo");
        Ok(id)
    }

    pub async fn update(&mut self, id: i64, task: &str) -> Result<bool, sqlx::Error> {
        let now = self.now();
        let rows_affected = query("UPDATE todos SET task = ?, updated_at = ? WHERE id = ?")
            .bind(task)
            .bind(now)
            .bind(id)
            .execute(&mut *self.conn)
            .await?
            .rows_affected();
        Ok(rows_affected > 0)
    }

    pub async fn toggle(&mut self, id: i64) -> Result<bool, sqlx::Error> {
        let now = self.now();
        let rows_affected = query(
            "UPDATE todos SET done = CASE done WHEN 1 THEN 0 ELSE 1 END, updated_at = ? WHERE id = ?",
        )
        .bind(now)
        .bind(id)
        .execute(&mut *self.conn)
        .await?
        .rows_affected();
        Ok(rows_affected > 0)
    }

    pub async fn delete(&mut self, id: i64) -> Result<bool, sqlx::Error> {
        let rows_affected = query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&mut *self.conn)
            .await?
            .rows_affected();
        Ok(rows_affected > 0)
    }
}


#[cfg(test)]
mod tests {
    use super::{test_clock::SteppingClock, *};
    use crate::db::memory_pool;

    #[test]
    fn timestamps_are_iso8601_with_z_suffix() {
        let clock = SteppingClock::new();
        assert_eq!(format_timestamp(clock.now()), "2024-01-01T12:00:00Z");
        assert_eq!(format_timestamp(clock.now()), "2024-01-01T12:00:01Z");
    }

    #[tokio::test]
    async fn create_inserts_an_open_todo_with_matching_timestamps() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let clock = SteppingClock::new();
        let mut repo = TodoRepository::new(&mut conn, &clock);

        let first = repo.create("Sample ToDo").await.unwrap();
        let before = repo.list_all().await.unwrap().len();
        let id = repo.create("Buy milk").await.unwrap();
        let todos = repo.list_all().await.unwrap();

        assert_eq!(todos.len(), before + 1);
        assert!(id > first);
        let todo = repo.get(id).await.unwrap().unwrap();
        assert_eq!(todo.task, "Buy milk");
        assert!(!todo.done);
        assert_eq!(todo.created_at, todo.updated_at);
        assert!(todo.created_at.ends_with('Z'));
    }

    #[tokio::test]
    async fn get_returns_none_for_unknown_id() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let clock = SteppingClock::new();
        let mut repo = TodoRepository::new(&mut conn, &clock);

        assert_eq!(repo.get(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn toggling_twice_restores_done_and_advances_updated_at() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let clock = SteppingClock::new();
        let mut repo = TodoRepository::new(&mut conn, &clock);

        let id = repo.create("Water plants").await.unwrap();
        let original = repo.get(id).await.unwrap().unwrap();

        assert!(repo.toggle(id).await.unwrap());
        let once = repo.get(id).await.unwrap().unwrap();
        assert!(once.done);
        assert!(once.updated_at > original.updated_at);

        assert!(repo.toggle(id).await.unwrap());
        let twice = repo.get(id).await.unwrap().unwrap();
        assert_eq!(twice.done, original.done);
        assert!(twice.updated_at > once.updated_at);
        assert_eq!(twice.created_at, original.created_at);
    }

    #[tokio::test]
    async fn update_changes_task_but_keeps_identity() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let clock = SteppingClock::new();
        let mut repo = TodoRepository::new(&mut conn, &clock);

        let id = repo.create("Buy milk").await.unwrap();
        let before = repo.get(id).await.unwrap().unwrap();

        assert!(repo.update(id, "Buy oat milk").await.unwrap());
        let after = repo.get(id).await.unwrap().unwrap();

        assert_eq!(after.id, before.id);
        assert_eq!(after.task, "Buy oat milk");
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn mutations_on_unknown_ids_report_not_found() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let clock = SteppingClock::new();
        let mut repo = TodoRepository::new(&mut conn, &clock);

        assert!(!repo.update(7, "nothing").await.unwrap());
        assert!(!repo.toggle(7).await.unwrap());
        assert!(!repo.delete(7).await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_row_and_second_delete_is_a_no_op() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let clock = SteppingClock::new();
        let mut repo = TodoRepository::new(&mut conn, &clock);

        let keep = repo.create("keep").await.unwrap();
        let gone = repo.create("gone").await.unwrap();

        assert!(repo.delete(gone).await.unwrap());
        assert!(!repo.delete(gone).await.unwrap());

        let ids: Vec<i64> = repo.list_all().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![keep]);
    }

    #[tokio::test]
    async fn ids_are_never_reused_after_delete() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let clock = SteppingClock::new();
        let mut repo = TodoRepository::new(&mut conn, &clock);

        let first = repo.create("a").await.unwrap();
        let second = repo.create("b").await.unwrap();
        repo.delete(second).await.unwrap();
        let third = repo.create("c").await.unwrap();

        assert!(third > second);
        assert!(second > first);
    }

    #[tokio::test]
    async fn list_is_ordered_by_id_regardless_of_update_order() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let clock = SteppingClock::new();
        let mut repo = TodoRepository::new(&mut conn, &clock);

        let a = repo.create("a").await.unwrap();
        let b = repo.create("b").await.unwrap();
        let c = repo.create("c").await.unwrap();
        repo.update(a, "a2").await.unwrap();
        repo.toggle(b).await.unwrap();
        repo.update(c, "c2").await.unwrap();
        repo.toggle(a).await.unwrap();

        let ids: Vec<i64> = repo.list_all().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a, b, c]);
    }
}

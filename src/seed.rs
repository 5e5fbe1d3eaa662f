use chrono::Duration;
use rand::Rng;

use crate::db::{self, Database, StoreError};

const BATCH_SIZE: usize = 1000;
const SPREAD_MS: i64 = 30 * 24 * 60 * 60 * 1000;

/// Inserts `count` demo todos spread over the last 30 days; every tenth one
/// is done. Rows go in batches, one transaction per batch.
pub async fn seed_todos(db: &Database, count: usize) -> Result<usize, StoreError> {
    let now = db::now();
    let mut inserted = 0;

    while inserted < count {
        let start = inserted + 1;
        let end = (inserted + BATCH_SIZE).min(count);
        db.call(move |conn| {
            let tx = conn.transaction()?;
            let mut rng = rand::thread_rng();
            for i in start..=end {
                let at = now - Duration::milliseconds(rng.gen_range(0..SPREAD_MS));
                db::todo::insert_seeded(
                    &tx,
                    &format!("Todo {i}"),
                    &format!("Description for Todo {i}"),
                    at,
                    i % 10 == 0,
                )?;
            }
            tx.commit()
        })
        .await?;

        inserted = end;
        tracing::info!(inserted, total = count, "seeded todos");
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeds_in_batches_with_every_tenth_done() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(seed_todos(&db, 1205).await.unwrap(), 1205);

        let (all, open) = db
            .call(|conn| {
                Ok((db::todo::count(conn, true)?, db::todo::count(conn, false)?))
            })
            .await
            .unwrap();
        assert_eq!(all, 1205);
        assert_eq!(open, 1205 - 120);
    }

    #[tokio::test]
    async fn zero_is_a_no_op() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(seed_todos(&db, 0).await.unwrap(), 0);
    }
}

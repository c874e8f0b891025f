use crate::{
    domains::sentinels::{Sentinel, SentinelSlugged},
    error::AppResult,
    infrastructure::Database,
};

pub const SAMPLE_TITLE: &str = "A sample title";

/// Create one sentinel of each kind when the tables are empty.
pub async fn seed_sample_data(db: &Database) -> AppResult<()> {
    if Sentinel::gen_all(db, 1).await?.is_empty() {
        let sentinel = Sentinel::create(db, SAMPLE_TITLE).await?;
        tracing::info!("Seeded sentinel {}", sentinel.id);
    }
    if SentinelSlugged::gen_all(db, 1).await?.is_empty() {
        let slugged = SentinelSlugged::create(db, SAMPLE_TITLE).await?;
        tracing::info!("Seeded slugged sentinel '{}'", slugged.slug);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let db = Database::new_in_memory().await.unwrap();
        seed_sample_data(&db).await.unwrap();
        seed_sample_data(&db).await.unwrap();

        let sentinels = Sentinel::gen_all(&db, 10).await.unwrap();
        assert_eq!(sentinels.len(), 1);
        assert_eq!(sentinels[0].id, 1);
        let slugged = SentinelSlugged::gen_all(&db, 10).await.unwrap();
        assert_eq!(slugged.len(), 1);
        assert_eq!(slugged[0].slug, "a-sample-title");
    }
}

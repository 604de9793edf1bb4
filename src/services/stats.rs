use crate::{
    models::{Idea, Vote},
    services::cache::CacheService,
};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const CACHE_KEY_PUBLIC_STATS: &str = "stats:public";
const CACHE_TTL_STATS: u64 = 60; // 1 minute

// Sample numbers served when the database cannot be reached.
const FALLBACK_IDEAS: u64 = 1250;
const FALLBACK_VOTES: u64 = 8400;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct PublicStats {
    pub ideas: u64,
    pub votes: u64,
}

pub struct StatsService {
    db: DatabaseConnection,
    cache: Option<CacheService>,
}

impl StatsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, cache: None }
    }

    pub fn with_cache(mut self, cache: CacheService) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Landing-page counters. Never fails: a broken database yields the
    /// fallback sample numbers instead of an error.
    pub async fn public_stats(&self) -> PublicStats {
        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get::<PublicStats>(CACHE_KEY_PUBLIC_STATS).await {
                return cached;
            }
        }

        let stats = match self.count_totals().await {
            Ok(stats) => stats,
            Err(err) => {
                tracing::warn!("public stats query failed, serving fallback: {}", err);
                return PublicStats {
                    ideas: FALLBACK_IDEAS,
                    votes: FALLBACK_VOTES,
                };
            }
        };

        if let Some(cache) = &self.cache {
            cache
                .set(CACHE_KEY_PUBLIC_STATS, &stats, CACHE_TTL_STATS)
                .await;
        }

        stats
    }

    async fn count_totals(&self) -> Result<PublicStats, sea_orm::DbErr> {
        let ideas = Idea::find().count(&self.db).await?;
        let votes = Vote::find().count(&self.db).await?;
        Ok(PublicStats { ideas, votes })
    }
}

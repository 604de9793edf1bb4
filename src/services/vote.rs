use crate::{
    error::{AppError, AppResult},
    models::{vote, Idea, Vote, VoteKind, VoteModel},
    score::VoteTally,
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Statement,
};
use std::collections::HashMap;

pub struct VoteService {
    db: DatabaseConnection,
}

impl VoteService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Upsert this user's vote on an idea and return the fresh tally.
    ///
    /// One row per (idea, user): a first vote inserts, a re-vote only
    /// flips the position flags. The unique index on the pair makes
    /// concurrent casts from the same user collapse into one row.
    pub async fn cast(&self, user_id: i32, idea_id: i32, kind: VoteKind) -> AppResult<VoteTally> {
        Idea::find_by_id(idea_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let (yes, maybe, no) = kind.flags();
        self.db
            .execute(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                "INSERT INTO idea_votes (idea_id, user_id, yes_vote, maybe_vote, no_vote, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
                 ON CONFLICT (idea_id, user_id)
                 DO UPDATE SET yes_vote = EXCLUDED.yes_vote,
                               maybe_vote = EXCLUDED.maybe_vote,
                               no_vote = EXCLUDED.no_vote,
                               updated_at = NOW()",
                vec![
                    idea_id.into(),
                    user_id.into(),
                    yes.into(),
                    maybe.into(),
                    no.into(),
                ],
            ))
            .await?;

        self.tally_for(idea_id).await
    }

    /// Current tally for one idea.
    pub async fn tally_for(&self, idea_id: i32) -> AppResult<VoteTally> {
        let rows = Vote::find()
            .filter(vote::Column::IdeaId.eq(idea_id))
            .all(&self.db)
            .await?;
        Ok(tally_rows(&rows))
    }

    /// Tallies for a batch of ideas in one query, for list enrichment.
    pub async fn tallies_for(&self, idea_ids: &[i32]) -> AppResult<HashMap<i32, VoteTally>> {
        if idea_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = Vote::find()
            .filter(vote::Column::IdeaId.is_in(idea_ids.to_vec()))
            .all(&self.db)
            .await?;

        let mut grouped: HashMap<i32, Vec<VoteModel>> = HashMap::new();
        for row in rows {
            grouped.entry(row.idea_id).or_default().push(row);
        }

        Ok(grouped
            .into_iter()
            .map(|(idea_id, rows)| (idea_id, tally_rows(&rows)))
            .collect())
    }

    /// This user's current position on an idea, if any.
    pub async fn user_vote(&self, user_id: i32, idea_id: i32) -> AppResult<Option<VoteKind>> {
        let row = Vote::find()
            .filter(vote::Column::IdeaId.eq(idea_id))
            .filter(vote::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(row.and_then(|r| r.kind()))
    }
}

fn tally_rows(rows: &[VoteModel]) -> VoteTally {
    let mut tally = VoteTally::default();
    for row in rows {
        match row.kind() {
            Some(VoteKind::Yes) => tally.yes += 1,
            Some(VoteKind::Maybe) => tally.maybe += 1,
            Some(VoteKind::No) => tally.no += 1,
            None => {} // corrupt row, skip rather than miscount
        }
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(idea_id: i32, user_id: i32, kind: VoteKind) -> VoteModel {
        let (yes, maybe, no) = kind.flags();
        let now = chrono::Utc::now().naive_utc();
        VoteModel {
            id: 0,
            idea_id,
            user_id,
            yes_vote: yes,
            maybe_vote: maybe,
            no_vote: no,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_rows_tally_to_zero() {
        let t = tally_rows(&[]);
        assert_eq!(t, VoteTally::default());
        assert_eq!(t.score(), 0);
    }

    #[test]
    fn one_yes_one_no_nets_to_zero_with_two_voters() {
        let rows = vec![row(1, 10, VoteKind::Yes), row(1, 11, VoteKind::No)];
        let t = tally_rows(&rows);
        assert_eq!(t.total(), 2);
        assert_eq!(t.score(), 0);
    }

    #[test]
    fn tally_counts_each_position() {
        let rows = vec![
            row(1, 10, VoteKind::Yes),
            row(1, 11, VoteKind::Yes),
            row(1, 12, VoteKind::Maybe),
            row(1, 13, VoteKind::No),
        ];
        let t = tally_rows(&rows);
        assert_eq!((t.yes, t.maybe, t.no), (2, 1, 1));
        assert_eq!(t.total(), 4);
    }

    #[test]
    fn corrupt_rows_are_skipped() {
        let mut bad = row(1, 10, VoteKind::Yes);
        bad.no_vote = true; // two flags set
        let t = tally_rows(&[bad, row(1, 11, VoteKind::Maybe)]);
        assert_eq!(t.total(), 1);
        assert_eq!(t.maybe, 1);
    }
}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The three mutually exclusive vote positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Yes,
    Maybe,
    No,
}

impl VoteKind {
    /// (yes_vote, maybe_vote, no_vote) column values for this position.
    pub fn flags(self) -> (bool, bool, bool) {
        match self {
            VoteKind::Yes => (true, false, false),
            VoteKind::Maybe => (false, true, false),
            VoteKind::No => (false, false, true),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VoteKind::Yes => "yes",
            VoteKind::Maybe => "maybe",
            VoteKind::No => "no",
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "idea_votes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub idea_id: i32,
    pub user_id: i32,
    pub yes_vote: bool,
    pub maybe_vote: bool,
    pub no_vote: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Model {
    pub fn kind(&self) -> Option<VoteKind> {
        match (self.yes_vote, self.maybe_vote, self.no_vote) {
            (true, false, false) => Some(VoteKind::Yes),
            (false, true, false) => Some(VoteKind::Maybe),
            (false, false, true) => Some(VoteKind::No),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::idea::Entity",
        from = "Column::IdeaId",
        to = "super::idea::Column::Id"
    )]
    Idea,
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id"
    )]
    Profile,
}

impl Related<super::idea::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Idea.def()
    }
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_mutually_exclusive() {
        for kind in [VoteKind::Yes, VoteKind::Maybe, VoteKind::No] {
            let (y, m, n) = kind.flags();
            assert_eq!([y, m, n].iter().filter(|&&b| b).count(), 1);
        }
    }

    #[test]
    fn kind_round_trips_through_flags() {
        for kind in [VoteKind::Yes, VoteKind::Maybe, VoteKind::No] {
            let (y, m, n) = kind.flags();
            let row = Model {
                id: 1,
                idea_id: 1,
                user_id: 1,
                yes_vote: y,
                maybe_vote: m,
                no_vote: n,
                created_at: chrono::Utc::now().naive_utc(),
                updated_at: chrono::Utc::now().naive_utc(),
            };
            assert_eq!(row.kind(), Some(kind));
        }
    }

    #[test]
    fn kind_rejects_corrupt_rows() {
        let row = Model {
            id: 1,
            idea_id: 1,
            user_id: 1,
            yes_vote: true,
            maybe_vote: true,
            no_vote: false,
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: chrono::Utc::now().naive_utc(),
        };
        assert_eq!(row.kind(), None);
    }
}

use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sectors an investor account is interested in, stored as a JSON array.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema,
)]
pub struct Sectors(pub Vec<String>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// "personal" or "company"; selects which name field is meaningful.
    pub profile_type: String,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub investor_type: Option<String>,
    pub investment_range: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub sectors: Option<Sectors>,
    /// Legacy "is investor" flag, kept as the stored "Yes"/"No" strings.
    pub interests: Option<String>,
    pub role: String, // "member" | "admin"
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Model {
    pub fn display_name(&self) -> &str {
        let name = if self.profile_type == "company" {
            self.company_name.as_deref()
        } else {
            self.full_name.as_deref()
        };
        name.unwrap_or(self.email.as_str())
    }

    pub fn is_investor(&self) -> bool {
        self.interests.as_deref() == Some("Yes")
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::idea::Entity")]
    Idea,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
}

impl Related<super::idea::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Idea.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Exactly one of full_name/company_name is meaningful, selected by
/// profile_type; the other is stored as NULL.
pub fn normalize_names(
    profile_type: &str,
    full_name: Option<&str>,
    company_name: Option<&str>,
) -> Result<(Option<String>, Option<String>), String> {
    match profile_type {
        "personal" => {
            let name = full_name
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| "full_name is required for personal accounts".to_string())?;
            Ok((Some(name.to_string()), None))
        }
        "company" => {
            let name = company_name
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| "company_name is required for company accounts".to_string())?;
            Ok((None, Some(name.to_string())))
        }
        _ => Err("profile_type must be 'personal' or 'company'".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Model {
        Model {
            id: 1,
            email: "a@example.com".to_string(),
            password_hash: "x".to_string(),
            profile_type: "personal".to_string(),
            full_name: Some("Ada".to_string()),
            company_name: None,
            bio: None,
            avatar_url: None,
            website: None,
            industry: None,
            investor_type: None,
            investment_range: None,
            sectors: None,
            interests: None,
            role: "member".to_string(),
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn display_name_follows_profile_type() {
        let mut p = base();
        assert_eq!(p.display_name(), "Ada");

        p.profile_type = "company".to_string();
        p.company_name = Some("Acme".to_string());
        assert_eq!(p.display_name(), "Acme");
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let mut p = base();
        p.full_name = None;
        assert_eq!(p.display_name(), "a@example.com");
    }

    #[test]
    fn investor_flag_reads_the_yes_no_string() {
        let mut p = base();
        assert!(!p.is_investor());
        p.interests = Some("Yes".to_string());
        assert!(p.is_investor());
        p.interests = Some("No".to_string());
        assert!(!p.is_investor());
    }

    #[test]
    fn personal_requires_full_name() {
        let (full, company) = normalize_names("personal", Some("Ada"), None).unwrap();
        assert_eq!(full.as_deref(), Some("Ada"));
        assert_eq!(company, None);

        assert!(normalize_names("personal", None, Some("Acme")).is_err());
        assert!(normalize_names("personal", Some("   "), None).is_err());
    }

    #[test]
    fn company_requires_company_name() {
        let (full, company) = normalize_names("company", Some("Ada"), Some("Acme")).unwrap();
        assert_eq!(full, None);
        assert_eq!(company.as_deref(), Some("Acme"));

        assert!(normalize_names("company", Some("Ada"), None).is_err());
    }

    #[test]
    fn unknown_profile_type_is_rejected() {
        assert!(normalize_names("alien", Some("Ada"), None).is_err());
    }

    #[test]
    fn sectors_convert_to_a_json_database_value() {
        let value: sea_orm::Value = Sectors(vec!["fintech".to_string()]).into();
        match value {
            sea_orm::Value::Json(Some(json)) => {
                assert_eq!(*json, serde_json::json!(["fintech"]));
            }
            other => panic!("expected a JSON value, got {other:?}"),
        }
    }

    #[test]
    fn names_are_trimmed() {
        let (full, _) = normalize_names("personal", Some("  Ada  "), None).unwrap();
        assert_eq!(full.as_deref(), Some("Ada"));
    }
}

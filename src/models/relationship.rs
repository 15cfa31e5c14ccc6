use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Reference data describing the nature of a family link (e.g. daughter, spouse)
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RelationshipType {
    pub id: i64,
    /// Machine name, e.g. `DAUGHTER`
    pub name: String,
    /// Localized label shown to users
    pub display_name: String,
}

/// Persisted senior↔guardian edge
#[derive(Debug, Clone, FromRow)]
pub struct FamilyRelationship {
    pub id: i64,
    pub senior_id: i64,
    pub guardian_id: i64,
    pub relationship_type_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A family member as seen from the other side of a relationship,
/// annotated with the relationship's display name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FamilyMemberView {
    pub id: i64,
    pub username: String,
    pub full_name: Option<String>,
    pub relationship_type: Option<String>,
}

/// Role-aware family aggregate: a senior sees their guardians, a guardian
/// sees their seniors
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum FamilyMembers {
    Senior { guardians: Vec<FamilyMemberView> },
    Guardian { seniors: Vec<FamilyMemberView> },
}

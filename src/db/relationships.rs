use sqlx::PgPool;

use crate::db::with_retry;
use crate::error::Result;
use crate::models::{FamilyMemberView, FamilyMembers, RelationshipType, User, UserRole};

/// List the relationship-type reference data
pub async fn list_relationship_types(pool: &PgPool) -> Result<Vec<RelationshipType>> {
    with_retry(|| {
        sqlx::query_as::<_, RelationshipType>(
            "SELECT id, name, display_name FROM relationship_types ORDER BY id",
        )
        .fetch_all(pool)
    })
    .await
}

pub async fn get_relationship_type(pool: &PgPool, id: i64) -> Result<Option<RelationshipType>> {
    with_retry(|| {
        sqlx::query_as::<_, RelationshipType>(
            "SELECT id, name, display_name FROM relationship_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
    })
    .await
}

/// Guardians linked to a senior, each annotated with the relationship's
/// display name. Empty when the senior has none or the id does not resolve
/// to a senior.
pub async fn list_guardians_of(pool: &PgPool, senior_id: i64) -> Result<Vec<FamilyMemberView>> {
    let guardians = sqlx::query_as::<_, FamilyMemberView>(
        r#"
        SELECT u.id, u.username, u.full_name, rt.display_name AS relationship_type
        FROM family_relationships fr
        JOIN users u ON u.id = fr.guardian_id
        LEFT JOIN relationship_types rt ON rt.id = fr.relationship_type_id
        WHERE fr.senior_id = $1
        ORDER BY fr.created_at
        "#,
    )
    .bind(senior_id)
    .fetch_all(pool)
    .await?;

    Ok(guardians)
}

/// Seniors a guardian cares for; symmetric to [`list_guardians_of`]
pub async fn list_seniors_of(pool: &PgPool, guardian_id: i64) -> Result<Vec<FamilyMemberView>> {
    let seniors = sqlx::query_as::<_, FamilyMemberView>(
        r#"
        SELECT u.id, u.username, u.full_name, rt.display_name AS relationship_type
        FROM family_relationships fr
        JOIN users u ON u.id = fr.senior_id
        LEFT JOIN relationship_types rt ON rt.id = fr.relationship_type_id
        WHERE fr.guardian_id = $1
        ORDER BY fr.created_at
        "#,
    )
    .bind(guardian_id)
    .fetch_all(pool)
    .await?;

    Ok(seniors)
}

/// Role-aware family aggregate for the given user
pub async fn get_family_members(pool: &PgPool, user: &User) -> Result<FamilyMembers> {
    match user.role {
        UserRole::Senior => Ok(FamilyMembers::Senior {
            guardians: list_guardians_of(pool, user.id).await?,
        }),
        UserRole::Guardian => Ok(FamilyMembers::Guardian {
            seniors: list_seniors_of(pool, user.id).await?,
        }),
    }
}

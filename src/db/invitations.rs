use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::{PgPool, Postgres, Transaction};

use crate::constants::{
    ERR_ALREADY_CONNECTED, ERR_CODE_ALREADY_USED, ERR_CODE_EXPIRED, ERR_ONLY_GUARDIANS_ACCEPT,
    ERR_ONLY_SENIORS_INVITE, INVITATION_CODE_ALPHABET, INVITATION_CODE_LENGTH,
    MAX_CODE_GENERATION_ATTEMPTS,
};
use crate::db::{is_unique_violation, users, with_retry};
use crate::error::{AppError, Result};
use crate::models::{CodeStatus, FamilyRelationship, Invitation, UserRole};

/// Parameters for a new single-use invitation code
#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub invitee_email: Option<String>,
    pub relationship_type_id: Option<i64>,
    pub expires_hours: i64,
}

/// Parameters for a new group invitation code
#[derive(Debug, Clone)]
pub struct NewGroupInvitation {
    pub max_guardians: i32,
    pub relationship_type_id: Option<i64>,
    pub expires_days: i64,
}

/// Generate one candidate invitation code: 8 characters drawn uniformly from
/// the restricted alphabet (uppercase + digits, no 0/O/1/I)
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..INVITATION_CODE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..INVITATION_CODE_ALPHABET.len());
            INVITATION_CODE_ALPHABET[idx] as char
        })
        .collect()
}

/// Insert an invitation row, regenerating the code on collision. The unique
/// index on `code` arbitrates races between concurrent generators.
async fn insert_with_unique_code(
    tx: &mut Transaction<'_, Postgres>,
    inviter_id: i64,
    invitee_email: Option<&str>,
    relationship_type_id: Option<i64>,
    expires_at: chrono::DateTime<Utc>,
    is_group_code: bool,
    max_guardians: i32,
) -> Result<Invitation> {
    for _ in 0..MAX_CODE_GENERATION_ATTEMPTS {
        let code = generate_code();
        let inserted = sqlx::query_as::<_, Invitation>(
            r#"
            INSERT INTO invitations
                (code, inviter_id, invitee_email, relationship_type_id, expires_at,
                 is_group_code, max_guardians)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (code) DO NOTHING
            RETURNING id, code, inviter_id, invitee_email, relationship_type_id, is_used,
                      expires_at, created_at, used_at, is_group_code, max_guardians,
                      current_guardians, is_active
            "#,
        )
        .bind(&code)
        .bind(inviter_id)
        .bind(invitee_email)
        .bind(relationship_type_id)
        .bind(expires_at)
        .bind(is_group_code)
        .bind(max_guardians)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some(invitation) = inserted {
            return Ok(invitation);
        }
        tracing::debug!("Invitation code collision, regenerating");
    }

    Err(AppError::Conflict(
        "Could not generate a unique invitation code".to_string(),
    ))
}

/// Require that the inviter resolves to a senior user
async fn require_senior(pool: &PgPool, inviter_id: i64) -> Result<()> {
    let inviter = users::get_user(pool, inviter_id).await?;
    match inviter {
        Some(user) if user.role == UserRole::Senior => Ok(()),
        _ => Err(AppError::PermissionDenied(ERR_ONLY_SENIORS_INVITE.to_string())),
    }
}

/// Create a single-use invitation code.
///
/// Any still-pending single-use code from the same inviter is superseded
/// (marked used) first, keeping at most one active code per senior.
pub async fn create_invitation(
    pool: &PgPool,
    inviter_id: i64,
    params: &NewInvitation,
) -> Result<Invitation> {
    require_senior(pool, inviter_id).await?;

    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let superseded = sqlx::query(
        r#"
        UPDATE invitations SET is_used = TRUE, used_at = $2
        WHERE inviter_id = $1 AND is_group_code = FALSE AND is_used = FALSE AND expires_at > $2
        "#,
    )
    .bind(inviter_id)
    .bind(now)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if superseded > 0 {
        tracing::info!(
            "Superseded {} pending invitation code(s) for inviter {}",
            superseded,
            inviter_id
        );
    }

    let invitation = insert_with_unique_code(
        &mut tx,
        inviter_id,
        params.invitee_email.as_deref(),
        params.relationship_type_id,
        now + Duration::hours(params.expires_hours),
        false,
        1,
    )
    .await?;

    tx.commit().await?;

    tracing::info!("Invitation code created for inviter {}", inviter_id);
    Ok(invitation)
}

/// Create a group invitation code accepting up to `max_guardians` guardians.
///
/// Any still-active group code from the same inviter is deactivated first,
/// keeping at most one active group code per senior.
pub async fn create_group_invitation(
    pool: &PgPool,
    inviter_id: i64,
    params: &NewGroupInvitation,
) -> Result<Invitation> {
    require_senior(pool, inviter_id).await?;

    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let deactivated = sqlx::query(
        "UPDATE invitations SET is_active = FALSE WHERE inviter_id = $1 AND is_group_code = TRUE AND is_active = TRUE",
    )
    .bind(inviter_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if deactivated > 0 {
        tracing::info!(
            "Deactivated {} group invitation code(s) for inviter {}",
            deactivated,
            inviter_id
        );
    }

    let invitation = insert_with_unique_code(
        &mut tx,
        inviter_id,
        None,
        params.relationship_type_id,
        now + Duration::days(params.expires_days),
        true,
        params.max_guardians,
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        "Group invitation code created for inviter {} (capacity {})",
        inviter_id,
        params.max_guardians
    );
    Ok(invitation)
}

/// Look up an invitation by its code, case-sensitive exact match
pub async fn get_by_code(pool: &PgPool, code: &str) -> Result<Option<Invitation>> {
    with_retry(|| {
        sqlx::query_as::<_, Invitation>(
            "SELECT id, code, inviter_id, invitee_email, relationship_type_id, is_used, \
             expires_at, created_at, used_at, is_group_code, max_guardians, current_guardians, \
             is_active FROM invitations WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(pool)
    })
    .await
}

/// Redeem an invitation code as the given guardian, creating the family
/// relationship and consuming the code in one transaction.
///
/// The code row is locked for the duration of the transaction so concurrent
/// acceptances serialize; the guarded terminal update and the unique
/// `(senior_id, guardian_id)` constraint close the remaining race windows.
pub async fn accept_invitation(
    pool: &PgPool,
    code: &str,
    guardian_id: i64,
    relationship_type_id: Option<i64>,
) -> Result<FamilyRelationship> {
    let guardian = users::get_user(pool, guardian_id).await?;
    match guardian {
        Some(user) if user.role == UserRole::Guardian => {}
        _ => {
            return Err(AppError::PermissionDenied(
                ERR_ONLY_GUARDIANS_ACCEPT.to_string(),
            ))
        }
    }

    let mut tx = pool.begin().await?;

    let invitation = sqlx::query_as::<_, Invitation>(
        "SELECT id, code, inviter_id, invitee_email, relationship_type_id, is_used, expires_at, \
         created_at, used_at, is_group_code, max_guardians, current_guardians, is_active \
         FROM invitations WHERE code = $1 FOR UPDATE",
    )
    .bind(code)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Invitation code not found".to_string()))?;

    let now = Utc::now();
    match invitation.status(now) {
        CodeStatus::Pending => {}
        CodeStatus::Expired => {
            // Lazily transition the row before failing
            if invitation.is_group_code {
                sqlx::query("UPDATE invitations SET is_active = FALSE WHERE id = $1")
                    .bind(invitation.id)
                    .execute(&mut *tx)
                    .await?;
            } else {
                sqlx::query("UPDATE invitations SET is_used = TRUE, used_at = $2 WHERE id = $1")
                    .bind(invitation.id)
                    .bind(now)
                    .execute(&mut *tx)
                    .await?;
            }
            tx.commit().await?;
            return Err(AppError::Expired(ERR_CODE_EXPIRED.to_string()));
        }
        CodeStatus::Consumed | CodeStatus::Exhausted => {
            return Err(AppError::InvalidState(ERR_CODE_ALREADY_USED.to_string()));
        }
    }

    let relationship = sqlx::query_as::<_, FamilyRelationship>(
        r#"
        INSERT INTO family_relationships (senior_id, guardian_id, relationship_type_id)
        VALUES ($1, $2, $3)
        RETURNING id, senior_id, guardian_id, relationship_type_id, created_at
        "#,
    )
    .bind(invitation.inviter_id)
    .bind(guardian_id)
    .bind(relationship_type_id.or(invitation.relationship_type_id))
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(ERR_ALREADY_CONNECTED.to_string())
        } else {
            e.into()
        }
    })?;

    // Terminal write, re-guarded against the row state
    let consumed = if invitation.is_group_code {
        sqlx::query(
            r#"
            UPDATE invitations
            SET current_guardians = current_guardians + 1,
                is_active = (current_guardians + 1 < max_guardians)
            WHERE id = $1 AND is_active = TRUE AND current_guardians < max_guardians
            "#,
        )
        .bind(invitation.id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
    } else {
        sqlx::query("UPDATE invitations SET is_used = TRUE, used_at = $2 WHERE id = $1 AND is_used = FALSE")
            .bind(invitation.id)
            .bind(now)
            .execute(&mut *tx)
            .await?
            .rows_affected()
    };

    if consumed == 0 {
        return Err(AppError::InvalidState(ERR_CODE_ALREADY_USED.to_string()));
    }

    tx.commit().await?;

    tracing::info!(
        "Guardian {} connected to senior {} via code {}",
        guardian_id,
        invitation.inviter_id,
        invitation.code
    );
    Ok(relationship)
}

/// Paged listing of the codes a user has created, newest first
pub async fn list_by_inviter(
    pool: &PgPool,
    inviter_id: i64,
    skip: i64,
    limit: i64,
) -> Result<(Vec<Invitation>, i64)> {
    let invitations = sqlx::query_as::<_, Invitation>(
        "SELECT id, code, inviter_id, invitee_email, relationship_type_id, is_used, expires_at, \
         created_at, used_at, is_group_code, max_guardians, current_guardians, is_active \
         FROM invitations WHERE inviter_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(inviter_id)
    .bind(limit)
    .bind(skip)
    .fetch_all(pool)
    .await?;

    let total =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM invitations WHERE inviter_id = $1")
            .bind(inviter_id)
            .fetch_one(pool)
            .await?;

    Ok((invitations, total))
}

/// Delete an invitation. Only its creator may do so.
pub async fn delete_invitation(pool: &PgPool, invitation_id: i64, requester_id: i64) -> Result<()> {
    let inviter_id =
        sqlx::query_scalar::<_, i64>("SELECT inviter_id FROM invitations WHERE id = $1")
            .bind(invitation_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Invitation code not found".to_string()))?;

    if inviter_id != requester_id {
        return Err(AppError::PermissionDenied(
            "Only the creator may delete an invitation code".to_string(),
        ));
    }

    sqlx::query("DELETE FROM invitations WHERE id = $1")
        .bind(invitation_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Bulk-expire pending codes whose expiry has passed. Returns the number of
/// rows transitioned; a second run right after returns 0.
pub async fn cleanup_expired(pool: &PgPool) -> Result<u64> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let singles = sqlx::query(
        "UPDATE invitations SET is_used = TRUE, used_at = $1 \
         WHERE is_group_code = FALSE AND is_used = FALSE AND expires_at < $1",
    )
    .bind(now)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    let groups = sqlx::query(
        "UPDATE invitations SET is_active = FALSE \
         WHERE is_group_code = TRUE AND is_active = TRUE AND expires_at < $1",
    )
    .bind(now)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;

    let total = singles + groups;
    if total > 0 {
        tracing::info!("Expired {} invitation code(s)", total);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_code_length_and_alphabet() {
        for _ in 0..200 {
            let code = generate_code();
            assert_eq!(code.len(), INVITATION_CODE_LENGTH);
            for c in code.bytes() {
                assert!(
                    INVITATION_CODE_ALPHABET.contains(&c),
                    "unexpected character {:?} in code {}",
                    c as char,
                    code
                );
            }
        }
    }

    #[test]
    fn test_alphabet_excludes_ambiguous_characters() {
        for ambiguous in [b'0', b'O', b'1', b'I'] {
            assert!(!INVITATION_CODE_ALPHABET.contains(&ambiguous));
        }
    }

    #[test]
    fn test_generated_codes_are_spread() {
        // 32^8 possible codes; 1000 draws colliding would indicate a broken generator
        let codes: HashSet<String> = (0..1000).map(|_| generate_code()).collect();
        assert_eq!(codes.len(), 1000);
    }
}

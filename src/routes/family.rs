use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::CurrentUser;
use crate::constants::{DEFAULT_MAX_GUARDIANS, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::db::{
    invitations::{self, NewGroupInvitation, NewInvitation},
    relationships,
};
use crate::error::{AppError, Result};
use crate::models::invitation::InvitationResponse;
use crate::models::{CodeStatus, FamilyMembers, RelationshipType};
use crate::{db, AppState};

#[derive(Debug, Deserialize)]
pub struct InviteCodeRequest {
    pub invitee_email: Option<String>,
    pub relationship_type_id: Option<i64>,
    #[serde(default)]
    pub is_group_code: bool,
}

#[derive(Debug, Deserialize)]
pub struct GroupInviteCodeRequest {
    pub max_guardians: Option<i32>,
    pub relationship_type_id: Option<i64>,
    pub expires_in_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FamilyConnectRequest {
    pub code: String,
    pub relationship_type_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct FamilyConnectResponse {
    pub success: bool,
    pub message: String,
    pub family_relationship_id: i64,
}

/// Public status view of an invitation code. Unknown codes report as invalid
/// rather than 404 so the client flow stays uniform.
#[derive(Debug, Serialize)]
pub struct InviteCodeStatusResponse {
    pub code: String,
    pub is_valid: bool,
    pub status: Option<CodeStatus>,
    pub is_used: bool,
    pub is_group_code: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub inviter_name: Option<String>,
    pub relationship_type: Option<String>,
    pub max_guardians: Option<i32>,
    pub current_guardians: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ListInvitationsParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct InvitationListResponse {
    pub invitations: Vec<InvitationResponse>,
    pub total_count: i64,
}

/// Create an invitation code (seniors only)
///
/// Creates a single-use code by default; `is_group_code` switches to a group
/// code with default capacity and lifetime.
pub async fn create_invite_code(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<InviteCodeRequest>,
) -> Result<Json<InvitationResponse>> {
    if let Some(email) = &payload.invitee_email {
        if !crate::models::User::validate_email(email) {
            return Err(AppError::Validation("Invalid invitee email".to_string()));
        }
    }

    let invitation = if payload.is_group_code {
        invitations::create_group_invitation(
            &state.pool,
            user.id,
            &NewGroupInvitation {
                max_guardians: DEFAULT_MAX_GUARDIANS,
                relationship_type_id: payload.relationship_type_id,
                expires_days: state.config.group_invite_expires_days,
            },
        )
        .await?
    } else {
        invitations::create_invitation(
            &state.pool,
            user.id,
            &NewInvitation {
                invitee_email: payload.invitee_email,
                relationship_type_id: payload.relationship_type_id,
                expires_hours: state.config.invite_expires_hours,
            },
        )
        .await?
    };

    state
        .notifier
        .invitation_created(user.id, &invitation.code, invitation.is_group_code);

    Ok(Json(invitation.into()))
}

/// Create a group invitation code with explicit capacity and lifetime
/// (seniors only)
pub async fn create_group_invite_code(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<GroupInviteCodeRequest>,
) -> Result<Json<InvitationResponse>> {
    let max_guardians = payload.max_guardians.unwrap_or(DEFAULT_MAX_GUARDIANS);
    if !(1..=100).contains(&max_guardians) {
        return Err(AppError::Validation(
            "max_guardians must be between 1 and 100".to_string(),
        ));
    }

    let expires_days = payload
        .expires_in_days
        .unwrap_or(state.config.group_invite_expires_days);
    if !(1..=365).contains(&expires_days) {
        return Err(AppError::Validation(
            "expires_in_days must be between 1 and 365".to_string(),
        ));
    }

    let invitation = invitations::create_group_invitation(
        &state.pool,
        user.id,
        &NewGroupInvitation {
            max_guardians,
            relationship_type_id: payload.relationship_type_id,
            expires_days,
        },
    )
    .await?;

    state
        .notifier
        .invitation_created(user.id, &invitation.code, true);

    Ok(Json(invitation.into()))
}

/// Status of an invitation code (no authentication required)
pub async fn invite_code_status(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<InviteCodeStatusResponse>> {
    let Some(invitation) = invitations::get_by_code(&state.pool, &code).await? else {
        return Ok(Json(InviteCodeStatusResponse {
            code,
            is_valid: false,
            status: None,
            is_used: false,
            is_group_code: false,
            expires_at: None,
            inviter_name: None,
            relationship_type: None,
            max_guardians: None,
            current_guardians: None,
        }));
    };

    let inviter_name = db::users::get_user(&state.pool, invitation.inviter_id)
        .await?
        .map(|u| u.display_name().to_string());

    let relationship_type = match invitation.relationship_type_id {
        Some(id) => relationships::get_relationship_type(&state.pool, id)
            .await?
            .map(|rt| rt.display_name),
        None => None,
    };

    let status = invitation.status(Utc::now());

    Ok(Json(InviteCodeStatusResponse {
        code: invitation.code,
        is_valid: status == CodeStatus::Pending,
        status: Some(status),
        is_used: invitation.is_used,
        is_group_code: invitation.is_group_code,
        expires_at: Some(invitation.expires_at),
        inviter_name,
        relationship_type,
        max_guardians: Some(invitation.max_guardians),
        current_guardians: Some(invitation.current_guardians),
    }))
}

/// Redeem an invitation code, linking the calling guardian to the senior who
/// issued it
pub async fn connect_family(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<FamilyConnectRequest>,
) -> Result<Json<FamilyConnectResponse>> {
    let relationship = invitations::accept_invitation(
        &state.pool,
        &payload.code,
        user.id,
        payload.relationship_type_id,
    )
    .await?;

    state.notifier.family_connected(
        user.id,
        relationship.senior_id,
        relationship.relationship_type_id,
    );

    Ok(Json(FamilyConnectResponse {
        success: true,
        message: "Family connection established".to_string(),
        family_relationship_id: relationship.id,
    }))
}

/// Family members of the calling user, shaped by their role
pub async fn family_members(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<FamilyMembers>> {
    let members = relationships::get_family_members(&state.pool, &user).await?;
    Ok(Json(members))
}

/// Invitation codes created by the calling user, newest first
pub async fn list_invitations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<ListInvitationsParams>,
) -> Result<Json<InvitationListResponse>> {
    let skip = params.skip.unwrap_or(0).max(0);
    let limit = params
        .limit
        .unwrap_or(DEFAULT_PAGE_LIMIT)
        .clamp(1, MAX_PAGE_LIMIT);

    let (invitations, total_count) =
        invitations::list_by_inviter(&state.pool, user.id, skip, limit).await?;

    Ok(Json(InvitationListResponse {
        invitations: invitations.into_iter().map(InvitationResponse::from).collect(),
        total_count,
    }))
}

/// Delete an invitation code (creator only)
pub async fn delete_invitation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(invitation_id): Path<i64>,
) -> Result<Json<Value>> {
    invitations::delete_invitation(&state.pool, invitation_id, user.id).await?;

    Ok(Json(json!({ "message": "Invitation code deleted" })))
}

/// Expire pending invitation codes past their expiry. Maintenance operation,
/// safe to run repeatedly.
pub async fn cleanup_invitations(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<Value>> {
    let expired_count = invitations::cleanup_expired(&state.pool).await?;

    Ok(Json(json!({
        "expired_count": expired_count,
        "message": format!("{} expired invitation code(s) cleaned up", expired_count),
    })))
}

/// Relationship-type reference data
pub async fn list_relationship_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<RelationshipType>>> {
    let types = relationships::list_relationship_types(&state.pool).await?;
    Ok(Json(types))
}

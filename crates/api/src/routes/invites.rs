//! Invite lifecycle routes: create, lookup, redeem, deactivate.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::events;
use domain::models::{GroupInvite, GroupMember, GroupWithMembers};
use domain::models::invite::{
    generate_invite_code, CreateInviteRequest, InviteLookupResponse, JoinGroupRequest,
    JoinGroupResponse, RedemptionFailure,
};
use persistence::repositories::{GroupRepository, InviteRepository};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_invite_redeemed;

/// Create a shareable invite for a group.
///
/// POST /api/groups/:group_id/invites
pub async fn create_invite(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
    Json(request): Json<CreateInviteRequest>,
) -> Result<Json<GroupInvite>, ApiError> {
    request.validate()?;

    let groups = GroupRepository::new(state.pool.clone());
    if groups.find_by_id(group_id).await?.is_none() {
        return Err(ApiError::NotFound("Group not found".into()));
    }

    let repo = InviteRepository::new(state.pool.clone());
    let code = repo.generate_unique_code(generate_invite_code).await?;
    let invite: GroupInvite = repo
        .create_invite(
            group_id,
            &code,
            request.invited_by.trim(),
            request.max_uses,
            request.expires_at,
        )
        .await?
        .into();

    info!(
        group_id = %group_id,
        invite_id = %invite.id,
        max_uses = ?invite.max_uses,
        "Invite created"
    );

    state
        .broadcaster
        .broadcast(events::INVITE_CREATED, json!({ "invite": &invite }));

    Ok(Json(invite))
}

/// List all invites for a group, newest first.
///
/// GET /api/groups/:group_id/invites
pub async fn list_invites(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<GroupInvite>>, ApiError> {
    let groups = GroupRepository::new(state.pool.clone());
    if groups.find_by_id(group_id).await?.is_none() {
        return Err(ApiError::NotFound("Group not found".into()));
    }

    let repo = InviteRepository::new(state.pool.clone());
    let invites = repo
        .list_for_group(group_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(invites))
}

/// Public lookup of an invite by its code.
///
/// GET /api/invites/:code
///
/// Inactive invites are treated as absent, so deactivated codes 404
/// just like unknown ones.
pub async fn lookup_invite(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<InviteLookupResponse>, ApiError> {
    let repo = InviteRepository::new(state.pool.clone());

    let row = repo
        .find_by_code_with_group(&code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invite not found".into()))?;

    Ok(Json(InviteLookupResponse {
        group: domain::models::group::GroupSummary {
            id: row.group_id,
            name: row.group_name.clone(),
            description: row.group_description.clone(),
        },
        invite: GroupInvite {
            id: row.id,
            group_id: row.group_id,
            invite_code: row.invite_code,
            invited_by: row.invited_by,
            expires_at: row.expires_at,
            is_active: row.is_active,
            max_uses: row.max_uses,
            current_uses: row.current_uses,
            created_at: row.created_at,
        },
    }))
}

/// Redeem an invite, joining its group.
///
/// POST /api/invites/:code/join
///
/// All rejection reasons collapse to one generic client message; the
/// concrete reason is only logged.
pub async fn join_group(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<JoinGroupRequest>,
) -> Result<Json<JoinGroupResponse>, ApiError> {
    request.validate()?;

    let repo = InviteRepository::new(state.pool.clone());

    let Some((invite, member)) = repo
        .redeem(
            &code,
            request.member_name.trim(),
            request.member_email.as_deref(),
        )
        .await?
    else {
        let reason = repo.failure_reason(&code).await.unwrap_or_else(|_| {
            // Classification is best-effort; the client message is
            // identical either way.
            RedemptionFailure::NotFound
        });
        debug!(code = %code, reason = %reason, "Invite redemption rejected");
        return Err(ApiError::Validation(
            RedemptionFailure::GENERIC_MESSAGE.to_string(),
        ));
    };

    let groups = GroupRepository::new(state.pool.clone());
    let group = groups
        .find_by_id(invite.group_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group not found".into()))?;
    let members: Vec<GroupMember> = groups
        .list_members(invite.group_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let group_with_members = GroupWithMembers {
        member_count: members.len() as i64,
        members,
        group: group.into(),
    };
    let member: GroupMember = member.into();

    info!(
        group_id = %invite.group_id,
        member_name = %member.name,
        uses = invite.current_uses,
        "Invite redeemed"
    );
    record_invite_redeemed();

    state.broadcaster.broadcast(
        events::MEMBER_JOINED,
        json!({ "group": &group_with_members, "member": &member }),
    );

    Ok(Json(JoinGroupResponse {
        group: group_with_members,
        member,
    }))
}

/// Deactivate an invite. One-way and idempotent.
///
/// PATCH /api/invites/:code/deactivate (path parameter is the invite ID)
pub async fn deactivate_invite(
    State(state): State<AppState>,
    Path(invite_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let repo = InviteRepository::new(state.pool.clone());

    let affected = repo.deactivate(invite_id).await?;
    if affected == 0 {
        return Err(ApiError::NotFound("Invite not found".into()));
    }

    info!(invite_id = %invite_id, "Invite deactivated");

    state
        .broadcaster
        .broadcast(events::INVITE_DEACTIVATED, json!({ "invite_id": invite_id }));

    Ok(Json(json!({ "message": "Invite deactivated" })))
}

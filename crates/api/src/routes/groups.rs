//! Group management routes for creating groups, adding members, and
//! reading per-member balances.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::events;
use domain::models::{Group, GroupBalances, GroupMember, GroupWithMembers};
use domain::models::group::{AddMemberRequest, CreateGroupRequest};
use persistence::repositories::GroupRepository;
use serde_json::json;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// Create a new group.
///
/// POST /api/groups
pub async fn create_group(
    State(state): State<AppState>,
    Json(request): Json<CreateGroupRequest>,
) -> Result<Json<Group>, ApiError> {
    request.validate()?;

    let repo = GroupRepository::new(state.pool.clone());
    let group: Group = repo
        .create_group(request.name.trim(), request.description.as_deref())
        .await?
        .into();

    info!(group_id = %group.id, group_name = %group.name, "Group created");

    state
        .broadcaster
        .broadcast(events::GROUP_CREATED, json!(&group));

    Ok(Json(group))
}

/// List all groups with their members.
///
/// GET /api/groups
pub async fn list_groups(
    State(state): State<AppState>,
) -> Result<Json<Vec<GroupWithMembers>>, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());

    let groups = repo.list_groups().await?;
    let ids: Vec<Uuid> = groups.iter().map(|g| g.id).collect();
    let mut members_by_group = repo.members_by_group(&ids).await?;

    let result = groups
        .into_iter()
        .map(|entity| {
            let members: Vec<GroupMember> = members_by_group
                .remove(&entity.id)
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect();
            GroupWithMembers {
                member_count: members.len() as i64,
                members,
                group: entity.into(),
            }
        })
        .collect();

    Ok(Json(result))
}

/// Fetch a single group with its members.
///
/// GET /api/groups/:group_id
pub async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupWithMembers>, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());

    let group = repo
        .find_by_id(group_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group not found".into()))?;

    let members: Vec<GroupMember> = repo
        .list_members(group_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(GroupWithMembers {
        member_count: members.len() as i64,
        members,
        group: group.into(),
    }))
}

/// Add a member to a group. Duplicate names are allowed.
///
/// POST /api/groups/:group_id/members
pub async fn add_member(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
    Json(request): Json<AddMemberRequest>,
) -> Result<Json<GroupMember>, ApiError> {
    request.validate()?;

    let repo = GroupRepository::new(state.pool.clone());

    if repo.find_by_id(group_id).await?.is_none() {
        return Err(ApiError::NotFound("Group not found".into()));
    }

    let member: GroupMember = repo
        .add_member(group_id, request.name.trim(), request.email.as_deref())
        .await?
        .into();

    info!(group_id = %group_id, member_name = %member.name, "Member added");

    state.broadcaster.broadcast(
        events::GROUP_MEMBER_ADDED,
        json!({ "group_id": group_id, "member": &member }),
    );

    Ok(Json(member))
}

/// Per-member unpaid balances and total shared expenses for a group.
///
/// GET /api/groups/:group_id/balances
pub async fn get_balances(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupBalances>, ApiError> {
    let repo = GroupRepository::new(state.pool.clone());

    if repo.find_by_id(group_id).await?.is_none() {
        return Err(ApiError::NotFound("Group not found".into()));
    }

    let total_shared = repo.total_shared(group_id).await?;
    let balances = repo
        .member_balances(group_id)
        .await?
        .into_iter()
        .map(|row| (row.member_name, row.total_owed.to_string()))
        .collect();

    Ok(Json(GroupBalances {
        total_shared: total_shared.to_string(),
        balances,
    }))
}

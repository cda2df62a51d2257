//! Broadcast event names and the wire envelope.
//!
//! Events are a best-effort cache-invalidation hint: observers refetch
//! authoritative state over the HTTP API after receiving one.

use chrono::Utc;
use serde::Serialize;

/// Synthetic event sent when an observer connection opens.
pub const CONNECTED: &str = "connected";
/// A transaction row was created (splits may not exist yet).
pub const TRANSACTION_CREATED: &str = "transaction_created";
/// A group was created.
pub const GROUP_CREATED: &str = "group_created";
/// A member was added to a group directly.
pub const GROUP_MEMBER_ADDED: &str = "group_member_added";
/// A member joined a group by redeeming an invite.
pub const MEMBER_JOINED: &str = "member-joined";
/// An invite was created.
pub const INVITE_CREATED: &str = "invite-created";
/// An invite was deactivated.
pub const INVITE_DEACTIVATED: &str = "invite-deactivated";
/// A profile was created.
pub const PROFILE_CREATED: &str = "profile-created";
/// A profile was updated.
pub const PROFILE_UPDATED: &str = "profile-updated";

/// Message envelope pushed to every observer.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    pub event: String,
    pub data: serde_json::Value,
    /// ISO-8601 timestamp of the broadcast.
    pub timestamp: String,
}

impl EventEnvelope {
    pub fn new(event: &str, data: serde_json::Value) -> Self {
        Self {
            event: event.to_string(),
            data,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Serialized form sent over the wire.
    pub fn to_message(&self) -> String {
        // EventEnvelope contains only serializable fields.
        serde_json::to_string(self).unwrap_or_default()
    }
}

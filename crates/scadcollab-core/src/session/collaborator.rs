//! Collaborator presence records.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Colors assigned to collaborators for presence indicators.
pub const PRESENCE_PALETTE: &[&str] = &[
    "#e57373", "#64b5f6", "#81c784", "#ffd54f", "#ba68c8", "#4dd0e1", "#ff8a65", "#a1887f",
];

/// Picks a random presence color from the palette.
pub fn random_presence_color() -> String {
    let mut rng = rand::thread_rng();
    PRESENCE_PALETTE
        .choose(&mut rng)
        .copied()
        .unwrap_or("#64b5f6")
        .to_string()
}

/// A connected user's presence record within a session.
///
/// Unique by `user_id`: adding a collaborator for an existing user
/// replaces the previous entry rather than duplicating it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorInfo {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    /// Color used for cursor/presence indicator rendering.
    pub color: String,
    pub joined_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

/// The caller-supplied part of a collaborator record.
///
/// `joined_at` and `last_active` are stamped on attach; a missing
/// `color` gets a random palette pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaboratorProfile {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    pub color: Option<String>,
}

impl CollaboratorProfile {
    /// Turns the profile into a full presence record stamped with `now`.
    pub fn into_info(self, now: DateTime<Utc>) -> CollaboratorInfo {
        CollaboratorInfo {
            user_id: self.user_id,
            display_name: self.display_name,
            email: self.email,
            color: self.color.unwrap_or_else(random_presence_color),
            joined_at: now,
            last_active: now,
        }
    }
}

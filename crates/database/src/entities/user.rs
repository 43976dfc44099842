use serde::{Deserialize, Serialize};

/// Identity record supplied by the external auth system.
///
/// Read-only to the messaging core; rows are never created or mutated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub username: String,
    pub email: String,
}

//! Actor identity carried in access tokens.
//!
//! The engine trusts the identity supplied by the authentication layer;
//! the subject of the token becomes `created_by`, `approved_by`, `voided_by`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (actor ID).
    pub sub: Uuid,
    /// Actor's role, informational only.
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for an actor.
    #[must_use]
    pub fn new(actor_id: Uuid, role: &str, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: actor_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the actor ID from claims.
    #[must_use]
    pub const fn actor_id(&self) -> Uuid {
        self.sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_new_sets_correct_fields() {
        let actor_id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::hours(1);

        let claims = Claims::new(actor_id, "treasurer", expires_at);

        assert_eq!(claims.sub, actor_id);
        assert_eq!(claims.actor_id(), actor_id);
        assert_eq!(claims.role, "treasurer");
        assert!(claims.iat <= Utc::now().timestamp());
        assert_eq!(claims.exp, expires_at.timestamp());
    }
}

use serde::{Deserialize, Serialize};

use crate::traits::Owned;
use crate::types::UserId;

/// The authenticated caller of a mutating operation.
///
/// Identity and the moderator flag are resolved by the gateway in front of
/// this service; the domain only consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub is_moderator: bool,
}

impl Actor {
    pub fn member(user_id: UserId) -> Self {
        Self {
            user_id,
            is_moderator: false,
        }
    }

    pub fn moderator(user_id: UserId) -> Self {
        Self {
            user_id,
            is_moderator: true,
        }
    }

    /// Owners may always act on their resources; moderators on anyone's.
    pub fn can_manage(&self, resource: &impl Owned) -> bool {
        self.is_moderator || resource.is_owned_by(self.user_id)
    }
}

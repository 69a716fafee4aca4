use crate::types::UserId;

/// A resource with a single owning user.
///
/// Ownership checks go through this accessor so callers never need to know
/// how a particular record stores its author.
pub trait Owned {
    fn owner_id(&self) -> UserId;

    fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id() == user
    }
}

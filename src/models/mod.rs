pub mod invitation;
pub mod relationship;
pub mod user;

pub use invitation::{CodeStatus, Invitation};
pub use relationship::{FamilyMemberView, FamilyMembers, FamilyRelationship, RelationshipType};
pub use user::{User, UserResponse, UserRole};

pub mod email;
pub mod feature;
pub mod object_type;
pub mod organization_id;
pub mod password;
pub mod plan_id;
pub mod profile_id;
pub mod subdomain;
pub mod subscription_status;
pub mod user_id;

pub use email::Email;
pub use feature::{FeatureKey, Limit, LimitKey};
pub use object_type::{ObjectAction, ObjectType};
pub use organization_id::OrganizationId;
pub use password::{HashedPassword, Password};
pub use plan_id::PlanId;
pub use profile_id::ProfileId;
pub use subdomain::Subdomain;
pub use subscription_status::SubscriptionStatus;
pub use user_id::UserId;

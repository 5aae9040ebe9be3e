pub use super::overtime_requests::Entity as OvertimeRequests;
pub use super::profiles::Entity as Profiles;
pub use super::user_roles::Entity as UserRoles;

pub mod report;
pub mod request;
pub mod user;

pub use report::{OvertimeStatistics, UserSummary};
pub use request::OvertimeRequest;
pub use user::{NewUser, User};

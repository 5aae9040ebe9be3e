pub mod approval;
pub use approval::{ApprovalError, ApprovalService, TransitionPlan, plan_transition};

pub mod requests;
pub use requests::{RequestError, RequestService, SubmitRequest};

pub mod directory;
pub use directory::{DirectoryError, DirectoryService, RoleUpdate};

pub mod reports;
pub use reports::{ReportError, ReportService};

//! Postgres implementations of the store traits.

pub mod assignment;
pub mod department;
pub mod history;
pub mod requirement;
pub mod role;
pub mod user;

pub use assignment::AssignmentRepository;
pub use department::DepartmentRepository;
pub use history::RoleHistoryRepository;
pub use requirement::RequirementRepository;
pub use role::RoleRepository;
pub use user::UserRepository;

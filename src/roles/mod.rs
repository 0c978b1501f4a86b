mod controller;
mod model;
mod repo;

pub use controller::RoleController;
pub use model::Role;
pub use repo::PgRoleRepository;

mod controller;
mod model;
mod repo;

pub use controller::UserController;
pub use model::User;
pub use repo::PgUserRepository;

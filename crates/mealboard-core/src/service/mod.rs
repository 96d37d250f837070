//! Domain services - the lifecycle managers that sit between transport
//! and the repository ports.

mod posts;
mod users;

pub use posts::PostService;
pub use users::{ProfileUpdate, RegisterInput, UserService};

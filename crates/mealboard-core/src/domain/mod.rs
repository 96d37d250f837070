//! Domain entities - the core business objects.

pub mod building;

mod post;
mod user;

pub use building::{Building, all as all_buildings, display_name, resolve};
pub use post::{Location, NewPost, Post, PostKind, PostView, Reporter};
pub use user::{NewUser, User};

// Sub-modules organized by functional domain
pub mod api;
pub mod reflection;
pub mod roadmap;
pub mod skill;
pub mod user;

// API response structures
pub use api::*;

pub use reflection::*;
pub use roadmap::*;
pub use skill::*;
pub use user::*;

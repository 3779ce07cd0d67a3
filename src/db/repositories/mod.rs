pub mod reflections;
pub mod roadmaps;
pub mod skills;
pub mod users;

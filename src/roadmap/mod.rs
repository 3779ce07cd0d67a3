pub mod instantiate;
pub mod migrate;
pub mod progress;
pub mod progression;
pub mod store;
pub mod templates;

pub use progression::{Outcome, RoadmapAction, Transition};
pub use store::{MemoryRoadmapStore, PgRoadmapStore, RoadmapStore};
pub use templates::TemplateCatalog;

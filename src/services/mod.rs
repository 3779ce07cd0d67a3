pub mod coach_service;
pub mod context;
pub mod onboarding_service;
pub mod reflections_service;
pub mod roadmap_service;
pub mod settings_service;
pub mod skills_service;
pub mod users_service;

pub use coach_service::CoachService;
pub use onboarding_service::OnboardingService;
pub use reflections_service::ReflectionsService;
pub use roadmap_service::RoadmapService;
pub use settings_service::SettingsService;
pub use skills_service::SkillsService;
pub use users_service::UsersService;

use diesel::prelude::*;
use tracing::info;

use crate::{
    coach::context::{MAX_REFLECTIONS, build_context, system_prompt},
    coach::{ChatRequest, CoachClient, CoachReply},
    db::repositories::reflections::ReflectionRepo,
    error::AppError,
    services::context::RequestContext,
    services::roadmap_service::RoadmapService,
};

pub struct CoachService;

impl CoachService {
    /// Answers one learner question with their roadmap position and
    /// latest reflections as context.
    pub async fn chat(
        conn: &mut PgConnection,
        roadmaps: &RoadmapService,
        coach: &dyn CoachClient,
        ctx: &RequestContext,
        req: &ChatRequest,
    ) -> Result<CoachReply, AppError> {
        let roadmap = roadmaps.find(&ctx.user_id).await?;
        let reflections = ReflectionRepo::latest(conn, &ctx.user_id, MAX_REFLECTIONS as i64)?;

        let context = build_context(roadmap.as_ref(), &reflections);
        let prompt = system_prompt(&context);
        let reply = coach.generate(&prompt, req.message.trim()).await?;

        info!(
            user_id = %ctx.user_id,
            sources = reply.sources.len(),
            "Coach replied"
        );
        Ok(reply)
    }
}

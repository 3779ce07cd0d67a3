use std::fmt::Write;

use crate::db::models::reflection::Reflection;
use crate::db::models::roadmap::{ProgressStatus, Roadmap};

/// Reflections included in the coach context.
pub const MAX_REFLECTIONS: usize = 3;
/// Characters kept from each reflection.
pub const REFLECTION_EXCERPT_CHARS: usize = 150;

/// Summarises the learner's roadmap position and latest reflections.
/// `reflections` is expected newest first.
pub fn build_context(roadmap: Option<&Roadmap>, reflections: &[Reflection]) -> String {
    let mut context = String::new();

    if let Some(roadmap) = roadmap {
        let _ = writeln!(context, "\n--- USER ROADMAP STATUS ---");
        let _ = writeln!(context, "Career Goal: {}", roadmap.career_goal);
        let _ = writeln!(context, "Learning Path: {}", roadmap.learning_path);

        if let Some(phase) = roadmap.active_phase() {
            let _ = writeln!(context, "Active Phase: {}", phase.title);
            let module = phase
                .modules
                .iter()
                .find(|m| m.status != ProgressStatus::Completed)
                .map(|m| m.name.as_str())
                .unwrap_or("Phase Review");
            let _ = writeln!(context, "Active Module: {}", module);
        } else if roadmap.is_complete() {
            let _ = writeln!(context, "Roadmap Status: all phases completed");
        }
    }

    let latest: Vec<&Reflection> = reflections.iter().take(MAX_REFLECTIONS).collect();
    if !latest.is_empty() {
        let _ = writeln!(context, "\n--- LATEST REFLECTIONS (Max {}) ---", MAX_REFLECTIONS);
        for (index, reflection) in latest.iter().enumerate() {
            let excerpt: String = reflection.content.chars().take(REFLECTION_EXCERPT_CHARS).collect();
            let _ = writeln!(
                context,
                "Reflection {} ({}): {}...",
                index + 1,
                reflection.updated_at.format("%Y-%m-%d"),
                excerpt
            );
        }
    }

    context
}

pub fn system_prompt(context: &str) -> String {
    format!(
        r#"You are the **AI Learning Coach**, a highly supportive, knowledgeable, and proactive mentor. Your goal is to guide the user in their career path by leveraging their current learning status and reflections.

**RULES:**
1. **Context First:** Use the provided USER CONTEXT (Roadmap and Reflections) to personalize your response.
2. **Grounding:** Use Google Search for up-to-date information, real-world examples, or specific technical details. Always include sources.
3. **Tone:** Encouraging, informative, and professional. Use markdown formatting (bold, lists) to improve readability.
4. **Actionable Advice:** Every response should either answer the user's question directly or offer an actionable next step, relevant resource, or challenge.
5. **Initialization:** When the chat is empty, provide a welcoming message and suggest ways to start the conversation based on the context (e.g., "Ask me about your active module," or "Should we review your latest reflection?").

{}

End of Context. Respond to the user's query."#,
        context
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::enums::{AvailableTime, LearningPath, Mood};
    use crate::roadmap::instantiate::instantiate;
    use crate::roadmap::templates::TemplateCatalog;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn roadmap() -> Roadmap {
        let catalog = TemplateCatalog::embedded().unwrap();
        instantiate(
            catalog.get(LearningPath::Creative).unwrap(),
            LearningPath::Creative,
            AvailableTime::Minutes60To120,
            "Publish an illustrated book",
            Utc::now(),
        )
    }

    fn reflection(content: &str, day: u32) -> Reflection {
        let at = Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap();
        Reflection {
            id: Uuid::new_v4(),
            user_id: "u1".into(),
            title: "Day".into(),
            content: content.into(),
            mood: Mood::Good,
            tags: vec![],
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn untouched_phase_reports_first_module() {
        let doc = roadmap();
        let ctx = build_context(Some(&doc), &[]);
        assert!(ctx.contains("Career Goal: Publish an illustrated book"));
        assert!(ctx.contains("Learning Path: creative"));
        assert!(ctx.contains(&format!("Active Phase: {}", doc.phases[0].title)));
        assert!(ctx.contains(&format!("Active Module: {}", doc.phases[0].modules[0].name)));
        assert!(!ctx.contains("LATEST REFLECTIONS"));
    }

    #[test]
    fn finished_modules_fall_back_to_phase_review() {
        let mut doc = roadmap();
        for module in &mut doc.phases[0].modules {
            module.status = ProgressStatus::Completed;
        }
        let ctx = build_context(Some(&doc), &[]);
        assert!(ctx.contains("Active Module: Phase Review"));
    }

    #[test]
    fn reflections_are_capped_and_truncated() {
        let long = "x".repeat(400);
        let items = vec![
            reflection(&long, 4),
            reflection("second", 3),
            reflection("third", 2),
            reflection("fourth", 1),
        ];
        let ctx = build_context(None, &items);
        assert!(ctx.contains(&format!("Reflection 1 (2025-03-04): {}...", "x".repeat(150))));
        assert!(!ctx.contains(&"x".repeat(151)));
        assert!(ctx.contains("Reflection 3 (2025-03-02): third..."));
        assert!(!ctx.contains("fourth"));
    }

    #[test]
    fn prompt_embeds_context() {
        let prompt = system_prompt("CTX-MARKER");
        assert!(prompt.contains("AI Learning Coach"));
        assert!(prompt.contains("CTX-MARKER\n\nEnd of Context."));
    }
}

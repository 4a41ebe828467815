use crate::memory::KnowledgeContext;
use crate::skills::IntentClass;

const DEFAULT_PERSONA: &str = "You are Luma, a calm desktop companion. You answer briefly and precisely, \
in one or two spoken sentences. You do not offer advice unless asked.";

/// How many archived solutions and projects make it into the prompt.
const RECENT_ITEMS: usize = 3;

/// Assembles the completion prompt from knowledge files and recent turns.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    user_name: String,
    max_history: usize,
}

impl PromptBuilder {
    pub fn new(user_name: &str, max_history: usize) -> Self {
        Self {
            user_name: user_name.to_string(),
            max_history,
        }
    }

    /// `history` holds `Speaker: text` lines, oldest first.
    pub fn build(
        &self,
        ctx: &KnowledgeContext,
        history: &[String],
        user_text: &str,
        class: IntentClass,
    ) -> String {
        let mut sections: Vec<String> = Vec::new();

        sections.push(ctx.persona.clone().unwrap_or_else(|| DEFAULT_PERSONA.to_string()));

        if let Some(guardrails) = &ctx.guardrails {
            sections.push(format!("Guardrails:\n{}", guardrails));
        }

        if class == IntentClass::Core {
            sections.push(format!(
                "{} is in engineering focus. Be exact and technical.",
                self.user_name
            ));
        }

        if !ctx.profile.is_empty() {
            let profile = ctx
                .profile
                .iter()
                .map(|(k, v)| match v.as_str() {
                    Some(s) => format!("- {}: {}", k, s),
                    None => format!("- {}: {}", k, v),
                })
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(format!("About {}:\n{}", self.user_name, profile));
        }

        if !ctx.solutions.is_empty() {
            let titles = recent(&ctx.solutions)
                .map(|s| format!("- {} ({})", s.title, s.id))
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(format!("Archived solutions:\n{}", titles));
        }

        if !ctx.projects.is_empty() {
            let projects = recent(&ctx.projects)
                .map(|p| format!("- {}: {}", p.id, p.details))
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(format!("Recent projects:\n{}", projects));
        }

        let skip = history.len().saturating_sub(self.max_history);
        let turns = history[skip..].join("\n");
        if !turns.is_empty() {
            sections.push(turns);
        }

        sections.push(format!("User: {}\nLuma:", user_text.trim()));
        sections.join("\n\n")
    }
}

fn recent<T>(items: &[T]) -> impl Iterator<Item = &T> {
    let skip = items.len().saturating_sub(RECENT_ITEMS);
    items[skip..].iter()
}

//! Persona: who the agent speaks as, and the system prompt that says so.
//!
//! [`build_system_prompt`] is a pure function of the persona name and the
//! knowledge base. It states the identity, embeds the knowledge verbatim and
//! spells out when each of the two tools must be called.

use serde::{Deserialize, Serialize};
use crate::knowledge::KnowledgeBase;

/// Name of the lead-capture tool.
pub const LEAD_CAPTURE_TOOL: &str = "record_user_details";

/// Name of the unknown-question tool.
pub const UNKNOWN_QUESTION_TOOL: &str = "record_unknown_question";

/// The persona the agent adopts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// The person the agent speaks as
    pub name: String,

    /// System prompt built from the name and knowledge base
    pub system_prompt: String,

    /// Knowledge files that went into the prompt (for diagnostics)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loaded_files: Vec<String>,
}

impl Persona {
    pub fn new(name: impl Into<String>, knowledge: &KnowledgeBase) -> Self {
        let name = name.into();
        let system_prompt = build_system_prompt(&name, knowledge);
        Self {
            name,
            system_prompt,
            loaded_files: knowledge.loaded_files.clone(),
        }
    }

    /// Estimate the token count of the system prompt (rough: 4 chars ≈ 1 token).
    pub fn estimated_tokens(&self) -> usize {
        self.system_prompt.len() / 4
    }

    /// Get a diagnostic summary of the loaded persona.
    pub fn diagnostic_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str(&format!("Persona: {}\n", self.name));
        summary.push_str(&format!(
            "System Prompt: {} chars (~{} tokens)\n",
            self.system_prompt.len(),
            self.estimated_tokens()
        ));
        summary.push_str(&format!("Knowledge Files: {}\n", self.loaded_files.len()));
        for f in &self.loaded_files {
            summary.push_str(&format!("  - {f}\n"));
        }
        summary
    }
}

/// Build the system instruction for `name`, grounded in `knowledge`.
pub fn build_system_prompt(name: &str, knowledge: &KnowledgeBase) -> String {
    let mut prompt = String::with_capacity(2048 + knowledge.combined().len());

    prompt.push_str(&format!(
        "You are acting as {name}. You are answering questions on {name}'s portfolio website, \
         particularly questions about {name}'s professional background, skills and experience. \
         Stay in character as {name} at all times and speak in the first person. \
         Be professional, engaging and friendly, as if talking to a potential client or future employer.\n"
    ));

    push_section(&mut prompt, "summary", &knowledge.summary_text);
    push_section(&mut prompt, "profile", &knowledge.profile_text);
    for section in &knowledge.extra {
        let tag = format!(
            "additional_context source=\"{}\"",
            section.source.replace('"', "'")
        );
        push_tagged(&mut prompt, &tag, "additional_context", &section.text);
    }

    prompt.push_str("\n<tools>\n");
    prompt.push_str(&format!(
        "- {LEAD_CAPTURE_TOOL}: call this whenever the visitor shares an email address or other \
         contact details, or asks to get in touch. Pass the email, and their name and any notes if known.\n"
    ));
    prompt.push_str(&format!(
        "- {UNKNOWN_QUESTION_TOOL}: call this whenever you cannot answer a question from the context \
         above, even if the question is trivial or unrelated to {name}'s career. Pass the question verbatim.\n"
    ));
    prompt.push_str("</tools>\n");

    prompt.push_str("\n<rules>\n");
    prompt.push_str("1. Answer only from the summary, profile and additional context above.\n");
    prompt.push_str(&format!(
        "2. Never invent facts about {name}. If the answer is not in the context, call \
         {UNKNOWN_QUESTION_TOOL} instead of guessing, then tell the visitor you will follow up.\n"
    ));
    prompt.push_str(&format!(
        "3. If the visitor seems interested in hiring or collaborating, ask for their email \
         and record it with {LEAD_CAPTURE_TOOL}.\n"
    ));
    prompt.push_str("4. When in doubt, prefer calling a tool over making something up.\n");
    prompt.push_str("5. Keep answers concise (under 4 sentences) unless asked to elaborate.\n");
    prompt.push_str("</rules>\n");

    prompt
}

fn push_section(prompt: &mut String, tag: &str, content: &str) {
    push_tagged(prompt, tag, tag, content);
}

fn push_tagged(prompt: &mut String, open: &str, close: &str, content: &str) {
    let content = content.trim();
    prompt.push_str(&format!("\n<{open}>\n"));
    if content.is_empty() {
        prompt.push_str("(not provided)");
    } else {
        prompt.push_str(content);
    }
    prompt.push_str(&format!("\n</{close}>\n"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeSection;

    fn knowledge() -> KnowledgeBase {
        KnowledgeBase::from_text(
            "Principal Data Architect, 15 years in cloud data platforms.",
            "I write the AI-First Data Architect blog series.",
        )
    }

    #[test]
    fn prompt_states_identity() {
        let prompt = build_system_prompt("Ada Lovelace", &knowledge());
        assert!(prompt.starts_with("You are acting as Ada Lovelace."));
        assert!(prompt.contains("Stay in character as Ada Lovelace"));
    }

    #[test]
    fn prompt_embeds_knowledge_verbatim() {
        let prompt = build_system_prompt("Ada", &knowledge());
        assert!(prompt.contains("<summary>\nI write the AI-First Data Architect blog series.\n</summary>"));
        assert!(prompt.contains("Principal Data Architect, 15 years in cloud data platforms."));
    }

    #[test]
    fn prompt_names_both_tools_and_when_to_use_them() {
        let prompt = build_system_prompt("Ada", &knowledge());
        assert!(prompt.contains("- record_user_details: call this whenever the visitor shares an email"));
        assert!(prompt.contains("- record_unknown_question: call this whenever you cannot answer"));
        assert!(prompt.contains("prefer calling a tool over making something up"));
    }

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(
            build_system_prompt("Ada", &knowledge()),
            build_system_prompt("Ada", &knowledge())
        );
    }

    #[test]
    fn empty_knowledge_is_marked_not_provided() {
        let prompt = build_system_prompt("Ada", &KnowledgeBase::default());
        assert!(prompt.contains("<profile>\n(not provided)\n</profile>"));
    }

    #[test]
    fn extra_sections_carry_their_source() {
        let mut kb = knowledge();
        kb.extra.push(KnowledgeSection {
            source: "website.txt".into(),
            text: "Philosophy: data products over data projects.".into(),
        });
        let prompt = build_system_prompt("Ada", &kb);
        assert!(prompt.contains("<additional_context source=\"website.txt\">"));
        assert!(prompt.contains("data products over data projects"));
    }

    #[test]
    fn persona_diagnostics() {
        let persona = Persona::new("Ada", &knowledge());
        assert_eq!(persona.name, "Ada");
        assert!(persona.estimated_tokens() > 50);
        assert!(persona.diagnostic_summary().contains("Persona: Ada"));
    }
}

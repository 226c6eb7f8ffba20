//! Instruction templates for the critique and resolution stages.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("placeholder pattern is valid")
});

/// Default researcher instruction. The question and the answer options are
/// repeated in front of it, keeping the same wording as earlier runs.
pub const DEFAULT_CRITIQUE: &str = "{{ question }}

{{ answers }}

You are a researcher tasked with investigating the {{ count }} answer options provided.
List the flaws and faulty logic of each answer option. Let's think step by step.";

/// Default resolver instruction.
pub const DEFAULT_RESOLUTION: &str = "You are a resolver tasked with:
- Finding which of the {{ count }} answer options the researcher thought was best
- Improving that answer
- Printing out the improved answer in full.
Let's work this out in a step by step way to be sure we have the right answer:";

/// The pair of templates used by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompts {
    pub critique: String,
    pub resolution: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            critique: DEFAULT_CRITIQUE.to_string(),
            resolution: DEFAULT_RESOLUTION.to_string(),
        }
    }
}

impl Prompts {
    pub fn render_critique(&self, question: &str, answers: &str, count: u32) -> String {
        render_template(&self.critique, &stage_vars(question, answers, count))
    }

    pub fn render_resolution(&self, question: &str, answers: &str, count: u32) -> String {
        render_template(&self.resolution, &stage_vars(question, answers, count))
    }
}

fn stage_vars(question: &str, answers: &str, count: u32) -> HashMap<String, String> {
    HashMap::from([
        ("question".to_string(), question.to_string()),
        ("answers".to_string(), answers.to_string()),
        ("count".to_string(), count.to_string()),
    ])
}

/// Renders a template string with the given variables. Unknown names render empty.
pub fn render_template(template: &str, vars: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures| {
            vars.get(&caps[1]).map(String::as_str).unwrap_or("").to_string()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_substituted() {
        let vars = HashMap::from([("name".to_string(), "Alice".to_string())]);
        assert_eq!(render_template("Hi {{name}}, {{ name }}!", &vars), "Hi Alice, Alice!");
    }

    #[test]
    fn unknown_placeholders_render_empty() {
        assert_eq!(render_template("[{{ missing }}]", &HashMap::new()), "[]");
    }

    #[test]
    fn critique_repeats_question_and_answers() {
        let prompt = Prompts::default().render_critique(
            "What is 2+2?",
            "Answer Option 1: 4\nAnswer Option 2: 5",
            4,
        );

        assert!(prompt.starts_with("What is 2+2?\n\nAnswer Option 1: 4\nAnswer Option 2: 5\n\n"));
        assert!(prompt.contains("investigating the 4 answer options"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn resolution_mentions_count() {
        let prompt = Prompts::default().render_resolution("q", "a", 3);
        assert!(prompt.contains("which of the 3 answer options"));
        assert!(prompt.contains("Printing out the improved answer in full."));
    }
}

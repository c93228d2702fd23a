//! Offline knowledge lookup backing the terminal fallback backend.
//!
//! Pure functions of the incoming prompt text and mode directive: classify
//! the prompt into a topic and a response category, then return a canned
//! bucket per topic, or a generic bucket keyed by category. No network, no
//! I/O, no failure modes.

mod topics;

pub use topics::Topic;

use topics::TOPICS;

/// Categories of user prompts, matched by cue phrases in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptCategory {
    Explain,
    Debug,
    Generate,
    Design,
    Learn,
    Help,
    General,
}

const EXPLAIN_CUES: &[&str] = &["explain", "what is", "how does", "tell me about"];
const DEBUG_CUES: &[&str] = &["debug", "error", "fix", "why is", "problem", "issue", "wrong"];
const GENERATE_CUES: &[&str] = &["generate", "create", "write", "build", "code", "script"];
const DESIGN_CUES: &[&str] = &["design", "architect", "structure", "how should", "best practice"];
const LEARN_CUES: &[&str] = &["learn", "tutorial", "guide", "steps", "how to"];
const HELP_CUES: &[&str] = &["help", "support", "assist", "guide me"];

/// Classify a prompt into a response category.
pub fn categorize(prompt: &str) -> PromptCategory {
    let prompt = prompt.to_lowercase();
    let matches = |cues: &[&str]| cues.iter().any(|cue| prompt.contains(cue));

    if matches(EXPLAIN_CUES) {
        PromptCategory::Explain
    } else if matches(DEBUG_CUES) {
        PromptCategory::Debug
    } else if matches(GENERATE_CUES) {
        PromptCategory::Generate
    } else if matches(DESIGN_CUES) {
        PromptCategory::Design
    } else if matches(LEARN_CUES) {
        PromptCategory::Learn
    } else if matches(HELP_CUES) {
        PromptCategory::Help
    } else {
        PromptCategory::General
    }
}

/// Find the first known topic mentioned in the prompt.
pub fn extract_topic(prompt: &str) -> Option<Topic> {
    let prompt = prompt.to_lowercase();
    Topic::ALL
        .iter()
        .copied()
        .find(|topic| topic.cues().iter().any(|cue| prompt.contains(cue)))
}

/// Produce a canned answer for a prompt under a given mode directive.
///
/// Topic-specific buckets win; otherwise a generic response keyed by
/// category, flavored by whether the directive addresses a beginner.
pub fn respond(prompt: &str, directive: &str) -> String {
    let category = categorize(prompt);

    if let Some(topic) = extract_topic(prompt) {
        if let Some(page) = TOPICS[&topic].page(category) {
            return page.to_string();
        }
    }

    let beginner = directive.to_lowercase().contains("beginner");
    generic_response(prompt, category, beginner)
}

fn generic_response(prompt: &str, category: PromptCategory, beginner: bool) -> String {
    let asked = snippet(prompt);
    match category {
        PromptCategory::Explain => format!(
            "**Explanation request**\n\nYour query: {asked}\n\n\
             There is no detailed offline entry for this topic. Known topics: \
             Docker, Kubernetes, CI/CD, Terraform, AWS, DevOps. Ask about one of \
             those, or configure a cloud backend for in-depth analysis."
        ),
        PromptCategory::Debug => format!(
            "**Debug request**\n\nIssue: {asked}\n\n\
             To narrow this down, include the exact error text, the command or \
             configuration that produced it, and environment details. Offline \
             debug notes exist for Docker, Kubernetes and CI/CD failures."
        ),
        PromptCategory::Generate => format!(
            "**Code generation**\n\nYour request: {asked}\n\n\
             Offline mode can outline Dockerfiles, Kubernetes manifests, pipeline \
             configs and Terraform modules. For complete generated code, configure \
             a cloud backend."
        ),
        PromptCategory::Design => format!(
            "**Architecture design**\n\nYour question: {asked}\n\n\
             Offline notes cover scalability approaches, high-availability \
             strategies and security practices. Ask about a specific pattern, or \
             configure a cloud backend for a full design review."
        ),
        PromptCategory::Learn => format!(
            "**Learning path**\n\nTopic: {asked}\n\n\
             Step-by-step guides are available for Docker, Kubernetes and CI/CD. \
             Try `learn docker`, or configure a cloud backend for interactive \
             tutoring."
        ),
        PromptCategory::Help => {
            if beginner {
                "**Help**\n\nTry `explain docker`, `explain kubernetes`, `learn ci/cd` \
                 or `debug <error>`. To unlock full answers, configure a cloud backend \
                 with an API key, or install Ollama for local AI."
                    .to_string()
            } else {
                "**Help**\n\nAvailable offline: technical explanations, system design \
                 notes, debug checklists for Docker/Kubernetes/CI-CD. Configure a cloud \
                 backend or switch to Ollama for generated answers."
                    .to_string()
            }
        }
        PromptCategory::General => {
            if beginner {
                format!(
                    "You asked: {asked}\n\n\
                     Offline mode can explain concepts, walk through guides and debug \
                     common errors for Docker, Kubernetes, CI/CD, Terraform, AWS and \
                     DevOps. For everything else, configure a cloud backend."
                )
            } else {
                format!(
                    "Request: {asked}\n\n\
                     Ready to assist with explanations, system design, troubleshooting \
                     and best practices from the offline knowledge base. Configure a \
                     cloud backend for generated responses."
                )
            }
        }
    }
}

/// First line of the prompt, bounded, safe on any char boundary.
fn snippet(prompt: &str) -> String {
    let line = prompt.lines().next().unwrap_or("");
    let mut out: String = line.chars().take(60).collect();
    if line.chars().count() > 60 {
        out.push('…');
    }
    out
}

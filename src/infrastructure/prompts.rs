//! Council prompt templates
//!
//! Three personas, one per stage. Templates are plain constants; the builder
//! assembles message lists from a shared project-context block.

use crate::domain::{ChatMessage, Commit, GenerationRequest, Project, ProjectFile};

/// Maximum file entries included in the context block
const MAX_CONTEXT_FILES: usize = 50;

/// Maximum README characters included in the context block
const MAX_README_CHARS: usize = 4000;

pub const ENGINEER_SYSTEM_PROMPT: &str = "You are a Senior Staff Engineer. Analyze the provided codebase context. \
Identify the core technology stack, validity of the code structure, and technical complexity. \
Be critical. Output a bulleted technical analysis.";

pub const RECRUITER_SYSTEM_PROMPT: &str = r#"You are a Tech Recruiter at a FAANG company. Write a punchy, 2-3 sentence 'Elevator Pitch' for this project.

Guidelines:
1. **Focus on Uniqueness**: What makes this project impressive? (e.g., "Combines Music Theory with Physics engines").
2. **Avoid "Status Updates"**: Do NOT list granular engineering tasks like "fixed bugs", "added features", "refactored code". Focus on the *capability* of the final product.
3. **Start Strong**: "An interactive visualizer..." or "A production-grade pipeline...".
4. **No Meta-Commentary**: Never say "This project...", "The repo...", or "Recent commits...".
5. **Specific Constraints**:
   - 'stock_price_target_modelling': Strategy 'v4.0 Optimal'. Performance: **40.8% XIRR**. (Use this latest figure).
   - 'Music-and-Math': Focus on the intersection of audio physics and theory.
   - 'Google-Analytics': Focus on bypassing sampling limits for granular data without mentioning specific row counts.
6. **No Absolute Currency Values**: Do NOT mention specific portfolio dollar amounts (e.g., "$135k")."#;

pub const RECRUITER_JOB_CONTEXT_ADDENDUM: &str = "\n\nCRITICAL: You must tailor this summary to specifically appeal to the following JOB CONTEXT. \
Highlight skills, words, and themes from the job description that match this project.";

pub const CHAIRMAN_SYSTEM_PROMPT: &str = r#"You are the Chairman of the LLM Council.
Synthesize the Technical Analysis and Recruiter Pitch into a JSON object for a portfolio.

CRITICAL RULES (STRICT ENFORCEMENT):
1. **NO META-COMMENTARY**: DELETE phrases like "The project...", "This repo...", "Recent commits show...", "Codebase lacks...", "Complexity is uncertain...", "Akash Agrawal...".
2. **NO ABSOLUTE CURRENCY VALUES**: Do NOT mention specific portfolio dollar amounts (e.g., "$135k", "$100,000"). Percentages (XIRR) are allowed.
3. **Focus on Capability**: Describe what the software DOES, not what the code LOOKS like.
4. 'ai_summary': A polished, professional paragraph (max 80 words) combining technical depth and business impact.
5. 'ai_tags': A list of strictly 3-4 relevant technical tags.
6. 'complexity_score': A score 1-10.

Output ONLY raw JSON (no markdown formatting).
{
    "ai_summary": "string",
    "ai_tags": ["tag1", "tag2", "tag3"],
    "complexity_score": 5
}"#;

/// Assembles stage requests from project data
pub struct PromptBuilder;

impl PromptBuilder {
    /// Shared context block: name, truncated file listing, recent commits,
    /// truncated README
    pub fn project_context(project: &Project) -> String {
        let files = render_files(&project.files);
        let commits = render_commits(&project.recent_commits);
        let readme = match project.readme.as_deref() {
            Some(readme) if !readme.is_empty() => truncate_chars(readme, MAX_README_CHARS),
            _ => "No README available.".to_string(),
        };

        format!(
            "PROJECT: {name}\n\nFILES/STRUCTURE:\n{files}\n\nRECENT COMMITS:\n{commits}\n\nREADME (Truncated):\n{readme}",
            name = project.name,
        )
    }

    /// Stage 1: critical technical assessment, low randomness
    pub fn analysis_request(context: &str) -> GenerationRequest {
        GenerationRequest::new(
            vec![
                ChatMessage::system(ENGINEER_SYSTEM_PROMPT),
                ChatMessage::user(context),
            ],
            0.3,
        )
    }

    /// Stage 2: persuasive capability pitch, medium randomness
    pub fn pitch_request(context: &str, job_context: Option<&str>) -> GenerationRequest {
        let system = match job_context {
            Some(_) => format!("{}{}", RECRUITER_SYSTEM_PROMPT, RECRUITER_JOB_CONTEXT_ADDENDUM),
            None => RECRUITER_SYSTEM_PROMPT.to_string(),
        };
        let user = match job_context {
            Some(job) => format!("{}\n\nJOB CONTEXT / TARGET AUDIENCE:\n{}", context, job),
            None => context.to_string(),
        };

        GenerationRequest::new(
            vec![ChatMessage::system(system), ChatMessage::user(user)],
            0.7,
        )
    }

    /// Stage 3: JSON synthesis of both prior outputs, low randomness
    pub fn synthesis_request(
        context: &str,
        analysis: &str,
        pitch: &str,
        job_context: Option<&str>,
    ) -> GenerationRequest {
        let job_section = match job_context {
            Some(job) => format!("\n\nJOB CONTEXT (Tailor the output to this if present):\n{}", job),
            None => String::new(),
        };
        let user = format!(
            "RAW CONTEXT:\n{context}\n\nTECHNICAL ANALYSIS (The Engineer):\n{analysis}\n\nIMPACT PITCH (The Recruiter):\n{pitch}{job_section}",
        );

        GenerationRequest::new(
            vec![
                ChatMessage::system(CHAIRMAN_SYSTEM_PROMPT),
                ChatMessage::user(user),
            ],
            0.1,
        )
        .with_json_mode()
    }
}

fn render_files(files: &[ProjectFile]) -> String {
    let listed: Vec<&ProjectFile> = files.iter().take(MAX_CONTEXT_FILES).collect();
    serde_json::to_string_pretty(&listed).unwrap_or_else(|_| "[]".to_string())
}

fn render_commits(commits: &[Commit]) -> String {
    serde_json::to_string_pretty(commits).unwrap_or_else(|_| "[]".to_string())
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

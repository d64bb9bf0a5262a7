//! Prompt text sent to the generation agent.

use crate::summary::ProjectSummary;

/// Section headers used when no template is supplied.
pub const DEFAULT_TEMPLATE: &str =
    "# Project Overview\n## Installation\n## Usage\n## API Reference\n## Contributing";

/// System prompt for documentation runs.
pub const WRITER_SYSTEM_PROMPT: &str = "\
You are an expert programmer and technical writer. You write comprehensive, \
well-structured Markdown documentation from a project's structure and the \
docstrings and signatures extracted from its source files.

1. Identify the main components, languages and design patterns.
2. Summarize the product's purpose and main features and how the components interact.
3. Give a breakdown of each major component: its purpose and functionality.
4. Include example usage for each component; examples must be correct.
5. Document all public APIs with usage examples and any authentication requirements.
6. Describe the error handling and logging used in the code.
7. Suggest use cases that build on the documented features.

Keep the documentation clear and concise for technical and non-technical readers. \
Use code blocks for examples. Answer in Markdown only.";

/// Builds the documentation request for one run.
///
/// The template is embedded verbatim; nothing is escaped or validated.
pub fn documentation_request(summary: &ProjectSummary, template: &str) -> String {
    format!(
        "Generate comprehensive documentation for the following Python project:\n\
         \n\
         Project Structure:\n\
         {structure}\n\
         \n\
         File Summaries:\n\
         {summaries}\n\
         \n\
         Documentation Template:\n\
         {template}\n\
         \n\
         Provide detailed documentation that explains the project's purpose, components, and interactions.\n",
        structure = summary.structure(),
        summaries = summary.text,
        template = template,
    )
}

/// System prompt for grading runs.
pub const GRADER_SYSTEM_PROMPT: &str = "\
You are an expert technical reviewer. You compare generated documentation \
against the original documentation and answer with a single JSON object.";

/// Builds the grading request comparing `generated` against `original`.
pub fn grading_request(original: &str, generated: &str) -> String {
    format!(
        "Evaluate the quality of the generated documentation against the original documentation.\n\
         \n\
         Original Documentation:\n\
         {original}\n\
         \n\
         Generated Documentation:\n\
         {generated}\n\
         \n\
         {RUBRIC}"
    )
}

const RUBRIC: &str = "\
Score each metric from 1 (worst) to 5 (best).

1. accuracy: how accurately the generated documentation reflects the content and intent of the original.
   5 entirely accurate, no errors or omissions; 4 minor errors or omissions; 3 some sections inaccurate \
or missing key details but overall correct; 2 significant inaccuracies in key sections; 1 largely \
inaccurate or missing substantial content.
2. clarity: how clearly the information is presented.
   5 exceptionally clear and logical; 4 minor unclear phrasing or structure; 3 some confusing sections; \
2 many unclear or poorly structured sections; 1 confusing, lacks structure.
3. closeness: whether all aspects of the original are covered.
   5 fully covered; 4 minor omissions; 3 some key aspects missing; 2 several important sections missing; \
1 large portions missing.
4. technical_accuracy: whether code examples, API references and technical details are correct and functional.
   5 all correct and functional; 4 minor inaccuracies; 3 some inaccuracies or non-functional examples; \
2 significant inaccuracies; 1 mostly incorrect.
5. readability: language quality and readability.
   5 clear, concise, professional; 4 minor readability issues; 3 unclear or informal in places; \
2 often unclear or unprofessional; 1 poor with significant issues.

Respond with only this JSON object:
{
  \"accuracy\": <1-5>,
  \"clarity\": <1-5>,
  \"closeness\": <1-5>,
  \"technical_accuracy\": <1-5>,
  \"readability\": <1-5>,
  \"strengths\": [\"...\"],
  \"weaknesses\": [\"...\"],
  \"suggestions\": [\"...\"]
}";

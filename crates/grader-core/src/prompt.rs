use serde::Serialize;

use crate::config::{CONTEXT_TEMPLATE, PromptLibrary, STANDARD_TEMPLATE};
use crate::error::{CoreError, CoreResult};
use crate::request::GradingRequest;

/// Placeholder text for context fields the request leaves out
const NOT_AVAILABLE: &str = "N/A";

/// Example answer shape shown to the model. Field order is the order the
/// model sees.
#[derive(Serialize)]
struct FormatExample {
    grade: &'static str,
    total_points: &'static str,
    feedback: &'static str,
    strengths: [&'static str; 2],
    improvements: [&'static str; 2],
}

const FORMAT_EXAMPLE: FormatExample = FormatExample {
    grade: "<numerical grade>",
    total_points: "<total possible points>",
    feedback: "<detailed explanation of the grade>",
    strengths: ["<strength 1>", "<strength 2>"],
    improvements: ["<area for improvement 1>", "<area for improvement 2>"],
};

/// Build the user prompt for a grading request
///
/// Picks the `with_context` template when the request carries course or
/// additional context, fills it and appends the JSON answer instructions.
pub fn build_grading_prompt(
    request: &GradingRequest,
    prompts: &PromptLibrary,
) -> CoreResult<String> {
    let rubric_text = request.rubric.render();

    let mut prompt = if request.has_context() {
        let template = prompts.grading_template(CONTEXT_TEMPLATE)?;
        fill_template(
            template,
            &[
                ("course_context", or_not_available(&request.course_context)),
                ("question", &request.question),
                ("rubric", &rubric_text),
                ("student_response", &request.student_response),
                (
                    "additional_context",
                    or_not_available(&request.additional_context),
                ),
            ],
        )?
    } else {
        let template = prompts.grading_template(STANDARD_TEMPLATE)?;
        fill_template(
            template,
            &[
                ("question", &request.question),
                ("rubric", &rubric_text),
                ("student_response", &request.student_response),
            ],
        )?
    };

    prompt.push_str(&json_format_instructions()?);
    Ok(prompt)
}

fn or_not_available(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(v) if !v.is_empty() => v,
        _ => NOT_AVAILABLE,
    }
}

/// The fixed suffix asking the model for a JSON answer
pub fn json_format_instructions() -> CoreResult<String> {
    let example = serde_json::to_string_pretty(&FORMAT_EXAMPLE)
        .map_err(|e| CoreError::TemplateFormat(format!("Failed to render JSON example: {}", e)))?;

    Ok(format!(
        "\n\nPlease provide your evaluation in the following JSON format:\n{}",
        example
    ))
}

/// Substitute `{name}` placeholders in a template
///
/// `{{` and `}}` produce literal braces. A placeholder without a value or an
/// unbalanced brace is a [`CoreError::TemplateFormat`].
///
/// # Examples
///
/// ```
/// use grader_core::prompt::fill_template;
///
/// let text = fill_template("Q: {question} {{json}}", &[("question", "Why?")]).unwrap();
/// assert_eq!(text, "Q: Why? {json}");
/// ```
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> CoreResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for n in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    name.push(n);
                }

                if !closed {
                    return Err(CoreError::TemplateFormat(
                        "unclosed '{' in template".to_string(),
                    ));
                }

                let value = values
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, value)| *value)
                    .ok_or_else(|| {
                        CoreError::TemplateFormat(format!(
                            "no value for placeholder '{{{}}}'",
                            name
                        ))
                    })?;
                out.push_str(value);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(CoreError::TemplateFormat(
                    "single '}' encountered in template".to_string(),
                ));
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

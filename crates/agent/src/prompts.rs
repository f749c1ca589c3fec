//! Fixed prompt text and fallback answers.

/// System message for the image description call.
pub const DESCRIBE_IMAGE_SYSTEM: &str =
    "You are a helpful assistant that describes the contents of an image.";

/// User message sent alongside the uploaded image.
pub const DESCRIBE_IMAGE_USER: &str = "Explain what do you see on this picture?";

/// System message for the tool-enabled conversation.
pub const NAME_ASSISTANT_SYSTEM: &str = "\
You are a specialized name management assistant with the following capabilities:
1. You can fetch and display all stored names using the 'fetch_all_names' tool
2. You can search for specific names using the 'find_name_by_name' tool
3. You can add new names using the 'add_new_name' tool

Guidelines:
- Always use the appropriate tool for name-related operations
- Only respond with name-related information
- If a request is not about names, politely explain that you can only help with name management
- When displaying names, present them in a clear, organized manner
- Confirm successful operations with brief, clear messages
";

pub const NO_RESPONSE_GENERATED: &str = "No response generated";
pub const NO_DESCRIPTION_GENERATED: &str = "No description generated";
pub const NO_RESPONSE_RECEIVED: &str = "No response received";

/// Returned when the model keeps calling tools past the iteration cap.
pub const MAX_ITERATIONS_REACHED: &str =
    "I've reached the maximum number of tool call iterations. Please provide further guidance.";

/// System message giving the assistant a named persona.
pub fn persona_system(name: &str) -> String {
    format!("You are an AI Assistant named {name}")
}

/// Wrap a user's subject in the image-generation instructions.
pub fn image_prompt(subject: &str) -> String {
    format!(
        "Create a highly detailed, professional image following these specifications:\n\
         Subject: {subject}\n\
         Technical Guidelines:\n\
         - Avoid text or writing in the image\n\
         - Ensure family-friendly content\n\
         - Focus on clear, sharp details\n\
         - Use balanced color composition"
    )
}

/// `text`, or `fallback` when the model produced nothing visible.
pub(crate) fn or_fallback(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_prompt_embeds_subject() {
        let prompt = image_prompt("a red fox in snow");
        assert!(prompt.starts_with("Create a highly detailed"));
        assert!(prompt.contains("\nSubject: a red fox in snow\n"));
        assert!(prompt.ends_with("- Use balanced color composition"));
    }

    #[test]
    fn persona_names_the_assistant() {
        assert_eq!(persona_system("LEXBOT"), "You are an AI Assistant named LEXBOT");
    }

    #[test]
    fn fallback_only_for_blank_text() {
        assert_eq!(or_fallback("  ".into(), NO_RESPONSE_RECEIVED), NO_RESPONSE_RECEIVED);
        assert_eq!(or_fallback("hi".into(), NO_RESPONSE_RECEIVED), "hi");
    }

    #[test]
    fn name_prompt_mentions_every_tool() {
        for tool in ["fetch_all_names", "find_name_by_name", "add_new_name"] {
            assert!(NAME_ASSISTANT_SYSTEM.contains(tool));
        }
    }
}

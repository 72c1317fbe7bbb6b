//! Prompt construction for flashcard generation.

use crate::error::GenerationError;

/// Trim the raw user input and reject it if nothing is left.
pub fn validate_topic(input: &str) -> Result<&str, GenerationError> {
    let topic = input.trim();
    if topic.is_empty() {
        return Err(GenerationError::EmptyInput);
    }
    Ok(topic)
}

/// Build the instruction sent to the model for `topic`.
///
/// The topic is embedded verbatim. The caller is expected to have run it
/// through [`validate_topic`] first.
pub fn flashcard_prompt(topic: &str) -> String {
    format!(
        "Generate a list of flashcards for the topic of \"{topic}\". \
Each flashcard should have a term and a concise definition. \
Format the output as a list of \"Term: Definition\" pairs, with each pair on a new line. \
Ensure terms and definitions are distinct and clearly separated by a single colon. \
Here's an example output:
Hello: Hola
Goodbye: Adiós"
    )
}

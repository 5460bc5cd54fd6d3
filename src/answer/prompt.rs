use crate::index::SearchResult;

const INSTRUCTIONS: &str = "Use the following pieces of context to answer the question at the end. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.";

/// Stuff every retrieved chunk into a single question-answering prompt
#[inline]
pub fn build_prompt(question: &str, context: &[SearchResult]) -> String {
    let context_text = context
        .iter()
        .map(|result| result.chunk.text.trim())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{}\n\n{}\n\nQuestion: {}\nHelpful Answer:",
        INSTRUCTIONS,
        context_text,
        question.trim()
    )
}

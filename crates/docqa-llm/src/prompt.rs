//! The fixed instruction template sent to the language model.
//!
//! The template tells the model to answer only from the provided context
//! and to say explicitly when the context is insufficient. That is a
//! content-level instruction, not an enforced invariant: the generator
//! does not validate that the answer is grounded.

pub const DOCUMENT_ANSWER_PROMPT: &str = r#"Use the following pieces of context to answer the question at the end.
 If you don't know the answer, just say  Oops! We are unable to find any relevant information from the documents to answer your question, don't try to make up an answer.

Context:
{context}

Instructions:
1. You always answer the with markdown formatting. You will be penalized if you do not answer with markdown when it would be possible. The markdown formatting you support: headings, bold, italic, links, tables, lists, code blocks, and blockquotes.
2. Don't mention markdown or ``` in the response.
3. Highlight important sections in the Answer in Bold.
4. Use bullets to format the long answers.
5..Your response should be comprehensive and not contradicted with the following context if they are relevant. Otherwise, ignore them if they are not relevant.

Question: {question}

Answer:
"#;

/// Render the template with `context` and `question` embedded verbatim.
pub fn render(question: &str, context: &str) -> String {
    DOCUMENT_ANSWER_PROMPT
        .replace("{context}", context)
        .replace("{question}", question)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_embeds_question_and_context_verbatim() {
        let prompt = render("What color is the sky?", "The sky is blue.");
        assert!(prompt.contains("Context:\nThe sky is blue."));
        assert!(prompt.contains("Question: What color is the sky?"));
    }

    #[test]
    fn render_keeps_the_no_information_instruction() {
        let prompt = render("q", "c");
        assert!(prompt.contains("unable to find any relevant information"));
    }
}

//! Prompt assembly.

/// Answer given when the context does not contain what was asked.
pub const FALLBACK_ANSWER: &str = "I'm sorry I can't help with that";

const INSTRUCTIONS: &str = r#"You are a helpful assistant that provides information based on the given context. Say "I'm sorry I can't help with that" if the answer isn't found in the context.

The context is provided with XML-style tags indicating the source file. For example:
<example.txt>
This is the content of example.txt
</example.txt>

Cite your sources by [1], [2], [3], etc. At the end of your response, include a references section in this exact format:

References:
[REFERENCES: { "files": ["source1.txt", "source2.pdf"] }]

Do not include any other text or formatting in your response besides:
1. Your answer with citations
2. The word "References:" on a new line
3. The [REFERENCES] JSON block
4. IMPORTANT: Only include files in the references that were actually used in the answer. Cite a source as [1] even if it was the third source you looked at."#;

/// Build the full prompt for one question over `context`.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!("{INSTRUCTIONS}\n\nContext:\n{context}\n\nUser Question:\n{question}")
}

//! Prompt composition — pure assembly of the final model prompt.
//!
//! Section order matters for model behavior: context first, then the role
//! instruction, then the quoted question, then the answer cue. The
//! instruction wording is the system's sole anti-hallucination control and
//! must not be paraphrased.

/// The fixed role instruction. The ONLY-use-context clause plus the
/// explicit say-you-cannot-answer escape steer the model away from
/// invention; keep the wording exact.
pub const ANSWER_INSTRUCTION: &str = "You are a Disaster Response Information AI. \
Answer the following user question based ONLY on the information provided above. \
If the information isn't present, say you cannot answer specifically but provide \
general safety advice relevant to disaster situations if appropriate. \
Be calm and clear.";

/// Compose the full prompt from a context block and the user's question.
///
/// Pure and total: string construction cannot fail, and identical inputs
/// always yield byte-identical output.
pub fn compose_prompt(context: &str, question: &str) -> String {
    format!("{context}\n---\n{ANSWER_INSTRUCTION}\n\nUser Question: \"{question}\"\n\nAnswer:")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CONTEXT: &str = "Use the following information to answer the user's question:\n\n--- Document 1 ---\nBoil water before drinking.\n\n";

    #[test]
    fn prompt_is_deterministic() {
        let a = compose_prompt(SAMPLE_CONTEXT, "Is the water safe?");
        let b = compose_prompt(SAMPLE_CONTEXT, "Is the water safe?");
        assert_eq!(a, b);
    }

    #[test]
    fn prompt_contains_question_and_instruction() {
        let prompt = compose_prompt(SAMPLE_CONTEXT, "Is the water safe?");
        assert!(prompt.contains("\"Is the water safe?\""));
        assert!(prompt.contains("based ONLY on the information provided above"));
    }

    #[test]
    fn section_order_preserved() {
        let prompt = compose_prompt(SAMPLE_CONTEXT, "Is the water safe?");

        let context_pos = prompt.find("Boil water").unwrap();
        let separator_pos = prompt.find("\n---\n").unwrap();
        let instruction_pos = prompt.find("Disaster Response Information AI").unwrap();
        let question_pos = prompt.find("User Question:").unwrap();

        assert!(context_pos < separator_pos);
        assert!(separator_pos < instruction_pos);
        assert!(instruction_pos < question_pos);
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn context_carried_verbatim() {
        let prompt = compose_prompt(SAMPLE_CONTEXT, "q");
        assert!(prompt.starts_with(SAMPLE_CONTEXT));
    }
}

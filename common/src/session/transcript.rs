use serde::{Deserialize, Serialize};

/// One answered question, in the order it was asked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// Chronological record of a session's question/answer pairs.
///
/// Pairs are only ever appended; nothing reorders, truncates, or
/// deduplicates them within a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transcript {
    pairs: Vec<QaPair>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.pairs.push(QaPair {
            question: question.into(),
            answer: answer.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn pairs(&self) -> &[QaPair] {
        &self.pairs
    }

    /// The exported form: one `Query:`/`Response:` block per pair, in
    /// arrival order.
    pub fn render(&self) -> String {
        let mut buffer = String::new();
        for pair in &self.pairs {
            buffer.push_str(&format!(
                "Query: {}\nResponse: {}\n\n",
                pair.question, pair.answer
            ));
        }
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_transcript_renders_nothing() {
        let transcript = Transcript::new();
        assert!(transcript.is_empty());
        assert_eq!(transcript.render(), "");
    }

    #[test]
    fn test_single_pair_rendering() {
        let mut transcript = Transcript::new();
        transcript.append("What is the summary?", "This is a summary.");

        assert_eq!(
            transcript.render(),
            "Query: What is the summary?\nResponse: This is a summary.\n\n"
        );
    }

    #[test]
    fn test_pairs_render_in_arrival_order() {
        let mut transcript = Transcript::new();
        transcript.append("q1", "a1");
        transcript.append("q2", "a2");

        assert_eq!(
            transcript.render(),
            "Query: q1\nResponse: a1\n\nQuery: q2\nResponse: a2\n\n"
        );
    }

    #[test]
    fn test_duplicate_questions_are_kept() {
        let mut transcript = Transcript::new();
        transcript.append("same question", "first answer");
        transcript.append("same question", "second answer");

        assert_eq!(transcript.len(), 2);
        let rendered = transcript.render();
        assert!(rendered.contains("first answer"));
        assert!(rendered.contains("second answer"));
        assert!(
            rendered.find("first answer") < rendered.find("second answer"),
            "pairs must keep arrival order"
        );
    }
}

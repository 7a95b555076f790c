//! Snapshot tests for the chat session

#[cfg(test)]
mod snapshot_tests {
    use std::sync::Arc;

    use insta::{assert_json_snapshot, assert_yaml_snapshot};

    use crate::test_support::{ScriptedBackend, index_pair_with_docs, state_with};
    use crate::{ChatSession, origin_label};
    use mmrag_core::DocumentOrigin;

    #[tokio::test]
    async fn test_history_snapshot() {
        let backend = Arc::new(ScriptedBackend::new(vec!["Fish ", "mostly"]));
        let state = state_with(index_pair_with_docs().await, backend);
        let mut session = ChatSession::new();

        session.take_turn(&state, "what do cats eat", |_| {}).await.unwrap();

        assert_yaml_snapshot!(session.history(), @r###"
        - role: user
          content: what do cats eat
        - role: assistant
          content: Fish mostly
        "###);

        session.clear_history();
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_turn_sources_snapshot() {
        let backend = Arc::new(ScriptedBackend::new(vec!["ok"]));
        let state = state_with(index_pair_with_docs().await, backend);
        let mut session = ChatSession::new();

        let outcome = session.take_turn(&state, "cats purr", |_| {}).await.unwrap();
        let sources: Vec<(&str, &str)> = outcome
            .retrieval
            .documents
            .iter()
            .map(|d| (d.record.source.as_str(), origin_label(d.origin)))
            .collect();

        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0], ("cats.pdf", "corpus"));
        assert_json_snapshot!(outcome.retrieval.phases, @r###"
        [
          "idle",
          "classifying",
          "searching_persisted",
          "merging",
          "done"
        ]
        "###);
    }

    #[test]
    fn test_origin_labels() {
        assert_eq!(origin_label(DocumentOrigin::Persisted), "corpus");
        assert_eq!(origin_label(DocumentOrigin::EphemeralText), "upload");
        assert_eq!(origin_label(DocumentOrigin::EphemeralImage), "upload image");
    }
}

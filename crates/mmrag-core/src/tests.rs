//! Snapshot tests for core types

#[cfg(test)]
mod snapshot_tests {
    use crate::{DocumentRecord, RagConfig, RetrievalPhase};
    use insta::{assert_json_snapshot, assert_yaml_snapshot};

    #[test]
    fn test_default_config_snapshot() {
        assert_yaml_snapshot!(RagConfig::default(), @r###"
        docs_dir: data/documents
        vectorstore_dir: vectorstore
        top_k: 3
        text_dimension: 384
        image_side: 16
        "###);
    }

    #[test]
    fn test_text_record_snapshot() {
        let record = DocumentRecord::text("guide.pdf", "Cats sleep a lot.");
        assert_yaml_snapshot!(record, @r###"
        type: text
        source: guide.pdf
        content: Cats sleep a lot.
        "###);
    }

    #[test]
    fn test_phase_names_snapshot() {
        let phases = vec![
            RetrievalPhase::Idle,
            RetrievalPhase::Classifying,
            RetrievalPhase::SearchingPersisted,
            RetrievalPhase::SearchingEphemeral,
            RetrievalPhase::Merging,
            RetrievalPhase::Done,
        ];
        assert_json_snapshot!(phases, @r###"
        [
          "idle",
          "classifying",
          "searching_persisted",
          "searching_ephemeral",
          "merging",
          "done"
        ]
        "###);
    }
}

/// Arrow schema for the persisted clause index.
pub mod clauses {
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    /// Name of the Lance table holding the clause corpus.
    pub const TABLE: &str = "risky_clauses";

    /// Schema for the `risky_clauses` table.
    ///
    /// `dim` is the embedding dimensionality of the model the index was
    /// built with; it is fixed for the lifetime of the table. The
    /// `embedding_model` column records the model identifier so queries
    /// under a different model can be refused.
    pub fn clause_schema(dim: i32) -> Schema {
        Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("risky_text", DataType::Utf8, false),
            Field::new("category", DataType::Utf8, false),
            Field::new("safe_rewrite", DataType::Utf8, false),
            Field::new(
                "embedding",
                DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim),
                false,
            ),
            Field::new("embedding_model", DataType::Utf8, false),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::clauses;
    use arrow::datatypes::DataType;

    #[test]
    fn clause_schema_has_expected_fields() {
        let schema = clauses::clause_schema(384);
        assert_eq!(schema.fields().len(), 6);
        assert!(schema.field_with_name("id").is_ok());
        assert!(schema.field_with_name("safe_rewrite").is_ok());
        assert!(schema.field_with_name("embedding_model").is_ok());
    }

    #[test]
    fn embedding_column_is_fixed_size() {
        let schema = clauses::clause_schema(384);
        let field = schema.field_with_name("embedding").unwrap();
        match field.data_type() {
            DataType::FixedSizeList(item, 384) => {
                assert_eq!(item.data_type(), &DataType::Float32);
            }
            other => panic!("unexpected embedding type: {other:?}"),
        }
    }
}

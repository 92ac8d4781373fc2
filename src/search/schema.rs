use tantivy::Index;
use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions};

use super::tokenizer::FOLDING_TOKENIZER_NAME;

/// The fields every indexed record is made of
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchField {
    Id,
    Title,
    Contents,
}

impl SearchField {
    /// All fields, in document order
    pub const ALL: [SearchField; 3] = [SearchField::Id, SearchField::Title, SearchField::Contents];

    /// Field name in the index schema
    pub fn name(self) -> &'static str {
        match self {
            SearchField::Id => "id",
            SearchField::Title => "title",
            SearchField::Contents => "contents",
        }
    }

    /// Relevance multiplier applied to matches in this field
    pub fn boost(self) -> f32 {
        match self {
            SearchField::Id => 0.5,
            SearchField::Title => 2.0,
            SearchField::Contents => 1.0,
        }
    }

    /// Whether the raw value can be read back from the index
    pub fn is_stored(self) -> bool {
        match self {
            SearchField::Id | SearchField::Title => true,
            SearchField::Contents => false,
        }
    }

    fn options(self) -> TextOptions {
        let indexing = TextFieldIndexing::default()
            .set_tokenizer(FOLDING_TOKENIZER_NAME)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions);
        let options = TextOptions::default().set_indexing_options(indexing);
        if self.is_stored() {
            options.set_stored()
        } else {
            options
        }
    }
}

/// Record index schema definition
#[derive(Clone, Debug)]
pub struct RecordSchema {
    pub schema: Schema,
    pub id: Field,
    pub title: Field,
    pub contents: Field,
}

impl RecordSchema {
    /// Create a new record schema
    pub fn new() -> Self {
        let mut builder = Schema::builder();

        let id = builder.add_text_field(SearchField::Id.name(), SearchField::Id.options());
        let title = builder.add_text_field(SearchField::Title.name(), SearchField::Title.options());
        let contents = builder.add_text_field(
            SearchField::Contents.name(),
            SearchField::Contents.options(),
        );

        Self {
            schema: builder.build(),
            id,
            title,
            contents,
        }
    }

    /// Resolve field handles from an index opened from disk
    pub fn from_index(index: &Index) -> tantivy::Result<Self> {
        let schema = index.schema();
        let id = schema.get_field(SearchField::Id.name())?;
        let title = schema.get_field(SearchField::Title.name())?;
        let contents = schema.get_field(SearchField::Contents.name())?;

        Ok(Self {
            schema,
            id,
            title,
            contents,
        })
    }

    /// Field handle for a logical field
    pub fn field(&self, field: SearchField) -> Field {
        match field {
            SearchField::Id => self.id,
            SearchField::Title => self.title,
            SearchField::Contents => self.contents,
        }
    }
}

impl Default for RecordSchema {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creation() {
        let schema = RecordSchema::new();

        for field in SearchField::ALL {
            assert!(schema.schema.get_field(field.name()).is_ok());
        }
    }

    #[test]
    fn test_stored_fields() {
        let schema = RecordSchema::new();

        assert!(schema.schema.get_field_entry(schema.id).is_stored());
        assert!(schema.schema.get_field_entry(schema.title).is_stored());
        assert!(!schema.schema.get_field_entry(schema.contents).is_stored());
    }

    #[test]
    fn test_boosts_are_positive() {
        for field in SearchField::ALL {
            assert!(field.boost() > 0.0);
        }
        assert!(SearchField::Title.boost() > SearchField::Contents.boost());
        assert!(SearchField::Contents.boost() > SearchField::Id.boost());
    }

    #[test]
    fn test_from_index_matches_new() {
        let schema = RecordSchema::new();
        let index = Index::create_in_ram(schema.schema.clone());

        let reopened = RecordSchema::from_index(&index).unwrap();
        for field in SearchField::ALL {
            assert_eq!(reopened.field(field), schema.field(field));
        }
    }
}

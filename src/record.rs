use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// A record owned by the external source; never modified by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub contents: String,
}

/// Read access to the authoritative records
pub trait RecordSource: Send + Sync {
    /// Every record, used for full rebuilds
    fn list_all(&self) -> Vec<SourceRecord>;

    /// Look up a single record for result hydration
    fn get_by_id(&self, id: i64) -> Option<SourceRecord>;
}

impl<T: RecordSource + ?Sized> RecordSource for Arc<T> {
    fn list_all(&self) -> Vec<SourceRecord> {
        (**self).list_all()
    }

    fn get_by_id(&self, id: i64) -> Option<SourceRecord> {
        (**self).get_by_id(id)
    }
}

/// An in-memory record set
#[derive(Debug, Clone, Default)]
pub struct StaticRecords {
    records: Vec<SourceRecord>,
    by_id: HashMap<i64, usize>,
}

impl StaticRecords {
    pub fn new(records: Vec<SourceRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            // first record wins for duplicate ids
            by_id.entry(record.id).or_insert(i);
        }
        Self { records, by_id }
    }

    /// Load records from a JSON array of `{id, title, contents}` objects
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read records file: {}", path.display()))?;
        let records: Vec<SourceRecord> =
            serde_json::from_str(&content).context("Failed to parse records JSON")?;
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for StaticRecords {
    fn list_all(&self) -> Vec<SourceRecord> {
        self.records.clone()
    }

    fn get_by_id(&self, id: i64) -> Option<SourceRecord> {
        self.by_id.get(&id).map(|&i| self.records[i].clone())
    }
}

/// Four sample records; every contents ends with the marker "VDWWD"
pub fn sample_records() -> Vec<SourceRecord> {
    vec![
        SourceRecord {
            id: 1,
            title: "Lorem Ipsum".to_string(),
            contents: "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat. VDWWD .".to_string(),
        },
        SourceRecord {
            id: 2,
            title: "Bootstrap".to_string(),
            contents: "Quickly design and customize responsive mobile-first sites with Bootstrap, the world’s most popular front-end open source toolkit, featuring Sass variables and mixins, responsive grid system, extensive prebuilt components, and powerful JavaScript plugins. VDWWD.".to_string(),
        },
        SourceRecord {
            id: 3,
            title: "Lucene.Net".to_string(),
            contents: "Lucene.Net is a port of the Lucene search engine library, written in C# and targeted at .NET runtime users. VDWWD.".to_string(),
        },
        SourceRecord {
            id: 4,
            title: "Weird Characters".to_string(),
            contents: "Thè qüick brôwn fox jùmps õver thë låzy døg. VDWWD.".to_string(),
        },
    ]
}

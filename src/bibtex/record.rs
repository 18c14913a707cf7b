use std::collections::HashMap;

/// A bibliography entry as read from the source file.
///
/// Field names are stored lower-cased. Missing fields read as the empty
/// string through the accessors, so downstream code never has to care
/// whether an entry declared e.g. an abstract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub key: String,
    pub entry_type: String,
    fields: HashMap<String, String>,
}

/// Collects the fields of one entry while it is being read.
///
/// Names are lower-cased on insertion; the last value given for a name wins.
pub struct RawRecordBuilder {
    key: String,
    entry_type: String,
    fields: HashMap<String, String>,
}

impl RawRecordBuilder {
    /// Start an entry from its citation key and `@type`
    pub fn new(key: impl Into<String>, entry_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entry_type: entry_type.into(),
            fields: HashMap::new(),
        }
    }

    pub fn field(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(field.into().to_lowercase(), value.into());
        self
    }

    /// Add fields in order, as they appear in the entry
    pub fn fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (field, value) in fields {
            self.fields.insert(field.into().to_lowercase(), value.into());
        }
        self
    }

    pub fn build(self) -> RawRecord {
        RawRecord {
            key: self.key,
            entry_type: self.entry_type,
            fields: self.fields,
        }
    }
}

impl RawRecord {
    pub fn builder(key: impl Into<String>, entry_type: impl Into<String>) -> RawRecordBuilder {
        RawRecordBuilder::new(key, entry_type)
    }

    pub fn get(&self, field: &str) -> Option<&String> {
        self.fields.get(field)
    }

    fn text(&self, field: &str) -> &str {
        self.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn title(&self) -> &str {
        self.text("title")
    }

    /// Authors as written in the `author` field ("A and B and C")
    pub fn authors(&self) -> &str {
        self.text("author")
    }

    pub fn abstract_text(&self) -> &str {
        self.text("abstract")
    }

    /// The DOI, used as the record's identifier in the output table
    pub fn identifier(&self) -> &str {
        self.text("doi")
    }
}

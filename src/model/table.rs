use indexmap::IndexMap;

/// A source table before normalization: a header row plus string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

// Create
impl RawTable {
    pub fn new(headers: Vec<impl ToString>, rows: Vec<Vec<impl ToString>>) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn records(&self) -> impl Iterator<Item = RawRecord<'_>> {
        self.rows.iter().map(move |cells| RawRecord {
            headers: &self.headers,
            cells,
        })
    }
}

/// One row of a [`RawTable`], addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    headers: &'a [String],
    cells: &'a [String],
}

impl<'a> RawRecord<'a> {
    /// Cell text, `None` when the column is absent or the row is short.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self.headers.iter().position(|h| h == column)?;
        self.cells.get(index).map(String::as_str)
    }

    /// Cells of every column not named in `known`, in header order.
    pub fn extra(&self, known: &[&str]) -> IndexMap<String, String> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !known.contains(&header.as_str()))
            .map(|(index, header)| {
                let cell = self.cells.get(index).cloned().unwrap_or_default();
                (header.clone(), cell)
            })
            .collect()
    }
}

/// Declared column set of one table kind.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub name: &'static str,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

impl Schema {
    /// Required columns missing from `table`, in declaration order.
    pub fn missing_columns(&self, table: &RawTable) -> Vec<String> {
        self.required
            .iter()
            .filter(|column| table.column_index(column).is_none())
            .map(|column| column.to_string())
            .collect()
    }

    pub fn known_columns(&self) -> Vec<&'static str> {
        [self.required, self.optional].concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCHEMA: Schema = Schema {
        name: "test",
        required: &["Module", "Count"],
        optional: &["Notes"],
    };

    #[test]
    fn short_rows_read_as_missing_cells() {
        let table = RawTable::new(vec!["Module", "Count"], vec![vec!["Inbox"]]);
        let record = table.records().next().unwrap();
        assert_eq!(record.get("Module"), Some("Inbox"));
        assert_eq!(record.get("Count"), None);
        assert_eq!(record.get("Unknown"), None);
    }

    #[test]
    fn missing_columns_lists_only_required() {
        let table = RawTable::new(vec!["Module", "Notes"], Vec::<Vec<&str>>::new());
        assert_eq!(SCHEMA.missing_columns(&table), vec!["Count".to_string()]);
    }

    #[test]
    fn extra_keeps_unknown_columns_in_header_order() {
        let table = RawTable::new(
            vec!["Owner", "Module", "Count", "Sprint"],
            vec![vec!["kate", "Inbox", "3", "12"]],
        );
        let record = table.records().next().unwrap();
        let extra = record.extra(&SCHEMA.known_columns());
        assert_eq!(
            extra.into_iter().collect::<Vec<_>>(),
            vec![
                ("Owner".to_string(), "kate".to_string()),
                ("Sprint".to_string(), "12".to_string()),
            ]
        );
    }
}

use crate::model::RawTable;
use crate::source::SourceError;
use csv::ReaderBuilder;
use std::io::Read;

pub fn read_table(path: &str) -> Result<RawTable, SourceError> {
    let to_error = |source| SourceError::Read {
        path: path.to_string(),
        source,
    };
    let reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(to_error)?;
    parse(reader).map_err(to_error)
}

fn parse<R: Read>(mut reader: csv::Reader<R>) -> Result<RawTable, csv::Error> {
    let headers = reader
        .headers()?
        .iter()
        .map(String::from)
        .collect::<Vec<_>>();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(record.iter().map(String::from).collect());
    }
    Ok(RawTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_str(text: &str) -> RawTable {
        parse(ReaderBuilder::new().flexible(true).from_reader(text.as_bytes())).unwrap()
    }

    #[test]
    fn quoted_list_cells_stay_whole() {
        let table = parse_str("Module,Bug Titles\nInbox,\"Login fixed,Sync error\"\n");
        assert_eq!(table.headers, vec!["Module", "Bug Titles"]);
        assert_eq!(
            table.rows,
            vec![vec!["Inbox".to_string(), "Login fixed,Sync error".to_string()]]
        );
    }

    #[test]
    fn ragged_and_blank_rows_are_tolerated() {
        let table = parse_str("Module,P0 issues Open,Notes\nInbox,2\n,,\nVoice,1,late\n");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["Inbox", "2"]);
        assert_eq!(table.rows[1], vec!["Voice", "1", "late"]);
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qa.csv");
        std::fs::write(&path, "Module\nInbox\n").unwrap();
        let table = read_table(path.to_str().unwrap()).unwrap();
        assert_eq!(table.rows, vec![vec!["Inbox".to_string()]]);
    }
}

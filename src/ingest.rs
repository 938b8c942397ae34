//! Ingestion boundary and persisted tables
//!
//! Documents arrive as JSON records with named `title` / `description`
//! fields. Intermediate tables may be written as delimited text and read back
//! later: token lists (one serialized list per document, either one per line
//! or as a `description_cleaned` column of a CSV table), the frequency table
//! (`word,count`) and the edge list (`Source,Target,Weight`). Every table
//! reader locates columns by name and fails with
//! [`NetworkError::MissingField`] when a required one is absent.

use crate::errors::{NetworkError, Result};
use crate::graph::cooccurrence::{CooccurrenceTable, WeightedPair};
use crate::stats::frequency::FrequencyTable;
use crate::types::Document;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use tracing::warn;

pub const TITLE_FIELD: &str = "title";
pub const DESCRIPTION_FIELD: &str = "description";

pub const WORD_COLUMN: &str = "word";
pub const COUNT_COLUMN: &str = "count";

pub const TOKEN_LIST_COLUMN: &str = "description_cleaned";

pub const SOURCE_COLUMN: &str = "Source";
pub const TARGET_COLUMN: &str = "Target";
pub const WEIGHT_COLUMN: &str = "Weight";

// ============================================================================
// Documents
// ============================================================================

/// Parse documents from a JSON array or JSON Lines text
pub fn parse_documents(input: &str) -> Result<Vec<Document>> {
    let trimmed = input.trim_start();
    let records: Vec<Value> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)?
    } else {
        trimmed
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(serde_json::from_str::<Value>)
            .collect::<std::result::Result<Vec<Value>, _>>()?
    };

    records
        .iter()
        .enumerate()
        .map(|(i, record)| document_from_record(i, record))
        .collect()
}

/// Validate one record against the document schema
///
/// The record must be an object naming at least one of `title` and
/// `description`. A field that is present but not a string is treated as
/// missing text, so the tokenizer skips it rather than failing the batch.
pub fn document_from_record(index: usize, record: &Value) -> Result<Document> {
    let Some(object) = record.as_object() else {
        return Err(NetworkError::parse(format!(
            "record #{index} is not a JSON object"
        )));
    };

    if !object.contains_key(TITLE_FIELD) && !object.contains_key(DESCRIPTION_FIELD) {
        return Err(NetworkError::missing_field(
            format!("{TITLE_FIELD}|{DESCRIPTION_FIELD}"),
            format!("record #{index}"),
        ));
    }

    let text_field = |name: &str| match object.get(name) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Null) | None => None,
        Some(other) => {
            warn!(record = index, field = name, value = %other, "non-text field treated as missing");
            None
        }
    };

    Ok(Document {
        title: text_field(TITLE_FIELD),
        description: text_field(DESCRIPTION_FIELD),
    })
}

// ============================================================================
// Token lists
// ============================================================================

/// Parse a serialized token list back into tokens
///
/// Accepts a JSON array of strings (`["서울", "맛집"]`) or a list literal
/// with single or double quotes (`['서울', '맛집']`).
pub fn parse_token_list(input: &str) -> Result<Vec<String>> {
    let s = input.trim();
    if let Ok(tokens) = serde_json::from_str::<Vec<String>>(s) {
        return Ok(tokens);
    }

    let inner = s
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| NetworkError::parse(format!("not a list literal: {s}")))?;

    let mut tokens = Vec::new();
    let mut chars = inner.chars().peekable();
    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let Some(quote) = chars.next() else {
            break;
        };
        if quote != '\'' && quote != '"' {
            return Err(NetworkError::parse(format!(
                "expected quoted token, found `{quote}` in {s}"
            )));
        }

        let mut token = String::new();
        let mut closed = false;
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped) => token.push(escaped),
                    None => break,
                },
                c if c == quote => {
                    closed = true;
                    break;
                }
                c => token.push(c),
            }
        }
        if !closed {
            return Err(NetworkError::parse(format!("unterminated token in {s}")));
        }
        tokens.push(token);

        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        match chars.next() {
            Some(',') | None => {}
            Some(other) => {
                return Err(NetworkError::parse(format!(
                    "expected `,` between tokens, found `{other}` in {s}"
                )))
            }
        }
    }

    Ok(tokens)
}

/// Write one JSON array per line
pub fn write_token_lists<W: Write>(mut out: W, token_lists: &[Vec<String>]) -> Result<()> {
    for tokens in token_lists {
        serde_json::to_writer(&mut out, tokens)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Read token lists written one per line, without re-tokenizing
pub fn read_token_lists<R: BufRead>(input: R) -> Result<Vec<Vec<String>>> {
    let mut lists = Vec::new();
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        lists.push(parse_token_list(&line)?);
    }
    Ok(lists)
}

// ============================================================================
// Delimited tables
// ============================================================================

fn check_field(value: &str) -> Result<&str> {
    if value.contains([',', '"', '\n', '\r']) {
        return Err(NetworkError::parse(format!(
            "value cannot be written unquoted: {value:?}"
        )));
    }
    Ok(value)
}

/// Rows of a delimited table
///
/// Fields may be wrapped in double quotes, in which case they can hold
/// commas, line breaks and doubled `""` quotes. Unquoted fields are trimmed.
/// Blank lines between rows are skipped.
struct Records<I> {
    lines: I,
    line_no: usize,
    table: &'static str,
}

impl<I: Iterator<Item = io::Result<String>>> Records<I> {
    fn new(lines: I, table: &'static str) -> Self {
        Self {
            lines,
            line_no: 0,
            table,
        }
    }

    /// Next row with the line number it starts on
    fn next_row(&mut self) -> Result<Option<(usize, Vec<String>)>> {
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;
        let mut was_quoted = false;
        let mut start = None;

        loop {
            let Some(line) = self.lines.next() else {
                return match start {
                    Some(line_no) => Err(NetworkError::parse(format!(
                        "{} line {line_no}: unterminated quoted field",
                        self.table
                    ))),
                    None => Ok(None),
                };
            };
            let mut line = line?;
            self.line_no += 1;
            if self.line_no == 1 && line.starts_with('\u{FEFF}') {
                line.replace_range(..'\u{FEFF}'.len_utf8(), "");
            }

            match start {
                Some(_) => field.push('\n'),
                None if line.trim().is_empty() => continue,
                None => start = Some(self.line_no),
            }

            let mut chars = line.chars().peekable();
            while let Some(c) = chars.next() {
                if in_quotes {
                    match c {
                        '"' if chars.peek() == Some(&'"') => {
                            chars.next();
                            field.push('"');
                        }
                        '"' => in_quotes = false,
                        c => field.push(c),
                    }
                    continue;
                }
                match c {
                    ',' => {
                        fields.push(finish_field(&mut field, was_quoted));
                        was_quoted = false;
                    }
                    '"' if !was_quoted && field.trim().is_empty() => {
                        field.clear();
                        in_quotes = true;
                        was_quoted = true;
                    }
                    // padding after a closing quote
                    c if was_quoted && c.is_whitespace() => {}
                    c => field.push(c),
                }
            }

            if !in_quotes {
                fields.push(finish_field(&mut field, was_quoted));
                return Ok(start.map(|line_no| (line_no, fields)));
            }
        }
    }
}

fn finish_field(field: &mut String, quoted: bool) -> String {
    let value = std::mem::take(field);
    if quoted {
        value
    } else {
        value.trim().to_string()
    }
}

/// Header of a delimited table with columns resolved by name
struct Header {
    columns: Vec<String>,
}

impl Header {
    fn read<I: Iterator<Item = io::Result<String>>>(records: &mut Records<I>) -> Result<Self> {
        let (_, columns) = records
            .next_row()?
            .ok_or_else(|| NetworkError::parse(format!("{} is empty", records.table)))?;
        Ok(Self { columns })
    }

    fn require(&self, name: &str, table: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| NetworkError::missing_field(name, format!("{table} header")))
    }
}

fn cell<'a>(row: &'a [String], idx: usize, line_no: usize, table: &str) -> Result<&'a str> {
    row.get(idx)
        .map(String::as_str)
        .ok_or_else(|| NetworkError::parse(format!("{table} line {line_no}: too few columns")))
}

/// Read token lists from a CSV table with a `description_cleaned` column
///
/// Each cell of that column holds one serialized list (see
/// [`parse_token_list`]), usually quoted because the list itself contains
/// commas. Other columns are ignored.
pub fn read_token_table<R: BufRead>(input: R) -> Result<Vec<Vec<String>>> {
    const TABLE: &str = "token table";
    let mut records = Records::new(input.lines(), TABLE);
    let header = Header::read(&mut records)?;
    let tokens_idx = header.require(TOKEN_LIST_COLUMN, TABLE)?;

    let mut lists = Vec::new();
    while let Some((line_no, row)) = records.next_row()? {
        let cell = cell(&row, tokens_idx, line_no, TABLE)?;
        let tokens = parse_token_list(cell).map_err(|e| match e {
            NetworkError::Parse(msg) => NetworkError::parse(format!("{TABLE} line {line_no}: {msg}")),
            other => other,
        })?;
        lists.push(tokens);
    }
    Ok(lists)
}

/// Write a frequency table as `word,count`, most frequent first
pub fn write_frequency_table<W: Write>(mut out: W, table: &FrequencyTable) -> Result<()> {
    writeln!(out, "{WORD_COLUMN},{COUNT_COLUMN}")?;
    for entry in table.top_n(table.len()) {
        writeln!(out, "{},{}", check_field(&entry.token)?, entry.count)?;
    }
    Ok(())
}

/// Read a `word,count` table
pub fn read_frequency_table<R: BufRead>(input: R) -> Result<FrequencyTable> {
    const TABLE: &str = "frequency table";
    let mut records = Records::new(input.lines(), TABLE);
    let header = Header::read(&mut records)?;
    let word_idx = header.require(WORD_COLUMN, TABLE)?;
    let count_idx = header.require(COUNT_COLUMN, TABLE)?;

    let mut table = FrequencyTable::new();
    while let Some((line_no, row)) = records.next_row()? {
        let word = cell(&row, word_idx, line_no, TABLE)?;
        let count: u64 = cell(&row, count_idx, line_no, TABLE)?
            .parse()
            .map_err(|e| NetworkError::parse(format!("{TABLE} line {line_no}: {e}")))?;
        table.add(word, count);
    }
    Ok(table)
}

/// Write an edge list as `Source,Target,Weight`, heaviest first
pub fn write_edge_list<W: Write>(mut out: W, pairs: &CooccurrenceTable) -> Result<()> {
    writeln!(out, "{SOURCE_COLUMN},{TARGET_COLUMN},{WEIGHT_COLUMN}")?;
    for edge in pairs.sorted_edges() {
        writeln!(
            out,
            "{},{},{}",
            check_field(&edge.source)?,
            check_field(&edge.target)?,
            edge.weight
        )?;
    }
    Ok(())
}

/// Read a `Source,Target,Weight` edge list into pair counts
///
/// Columns may appear in any order; extra columns are ignored.
pub fn read_edge_list<R: BufRead>(input: R) -> Result<CooccurrenceTable> {
    const TABLE: &str = "edge list";
    let mut records = Records::new(input.lines(), TABLE);
    let header = Header::read(&mut records)?;
    let source_idx = header.require(SOURCE_COLUMN, TABLE)?;
    let target_idx = header.require(TARGET_COLUMN, TABLE)?;
    let weight_idx = header.require(WEIGHT_COLUMN, TABLE)?;

    let mut pairs = Vec::new();
    while let Some((line_no, row)) = records.next_row()? {
        let weight: u32 = cell(&row, weight_idx, line_no, TABLE)?
            .parse()
            .map_err(|e| NetworkError::parse(format!("{TABLE} line {line_no}: {e}")))?;
        pairs.push(WeightedPair {
            source: cell(&row, source_idx, line_no, TABLE)?.to_string(),
            target: cell(&row, target_idx, line_no, TABLE)?.to_string(),
            weight,
        });
    }
    Ok(pairs.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_documents_array() {
        let docs = parse_documents(
            r#"[{"title": "서울 맛집", "description": "추천"}, {"description": null, "title": 3}]"#,
        )
        .unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].text().as_deref(), Some("서울 맛집 추천"));
        assert_eq!(docs[1].text(), None);
    }

    #[test]
    fn test_parse_documents_jsonl() {
        let docs = parse_documents("{\"title\": \"a\"}\n\n{\"description\": \"b\"}\n").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].description.as_deref(), Some("b"));
    }

    #[test]
    fn test_parse_documents_missing_fields() {
        let err = parse_documents(r#"[{"title": "a"}, {"body": "b"}]"#).unwrap_err();
        match err {
            NetworkError::MissingField { field, record } => {
                assert_eq!(field, "title|description");
                assert_eq!(record, "record #1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_token_list_forms() {
        assert_eq!(
            parse_token_list(r#"["서울", "맛집"]"#).unwrap(),
            vec!["서울", "맛집"]
        );
        assert_eq!(
            parse_token_list("['서울', '맛집', \"여행\"]").unwrap(),
            vec!["서울", "맛집", "여행"]
        );
        assert_eq!(parse_token_list("[]").unwrap(), Vec::<String>::new());
        assert_eq!(parse_token_list(r"['it\'s']").unwrap(), vec!["it's"]);
    }

    #[test]
    fn test_parse_token_list_rejects_garbage() {
        assert!(parse_token_list("서울 맛집").is_err());
        assert!(parse_token_list("['서울'").is_err());
        assert!(parse_token_list("['서울' '맛집']").is_err());
        assert!(parse_token_list("[서울]").is_err());
    }

    #[test]
    fn test_token_lists_round_trip() {
        let lists = vec![vec!["서울".to_string(), "맛집".to_string()], vec![]];
        let mut buf = Vec::new();
        write_token_lists(&mut buf, &lists).unwrap();

        let back = read_token_lists(Cursor::new(buf)).unwrap();
        assert_eq!(back, lists);
    }

    #[test]
    fn test_frequency_table_io() {
        let table = FrequencyTable::aggregate(&[vec!["서울", "맛집", "서울"]]);
        let mut buf = Vec::new();
        write_frequency_table(&mut buf, &table).unwrap();
        assert_eq!(String::from_utf8(buf.clone()).unwrap(), "word,count\n서울,2\n맛집,1\n");

        let back = read_frequency_table(Cursor::new(buf)).unwrap();
        assert_eq!(back.count("서울"), 2);
    }

    #[test]
    fn test_edge_list_by_name() {
        let csv = "Weight,Target,Source,Extra\n5,b,a,x\n3,c,b,y\n";
        let pairs = read_edge_list(Cursor::new(csv)).unwrap();

        assert_eq!(pairs.get("a", "b"), 5);
        assert_eq!(pairs.get("c", "b"), 3);
    }

    #[test]
    fn test_edge_list_missing_column() {
        let err = read_edge_list(Cursor::new("Source,Target\na,b\n")).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::MissingField { ref field, .. } if field == "Weight"
        ));
    }

    #[test]
    fn test_edge_list_rejects_negative_weight() {
        let err = read_edge_list(Cursor::new("Source,Target,Weight\na,b,-2\n")).unwrap_err();
        assert!(matches!(err, NetworkError::Parse(_)));
    }

    #[test]
    fn test_edge_list_write_sorted() {
        let pairs = CooccurrenceTable::extract_pairs(&[vec!["b", "a"], vec!["a", "b", "c"]]);
        let mut buf = Vec::new();
        write_edge_list(&mut buf, &pairs).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Source,Target,Weight");
        assert_eq!(lines[1], "a,b,2");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_token_table_reads_quoted_lists() {
        let csv = concat!(
            "\u{FEFF},title,description,description_cleaned\n",
            "0,\"서울 맛집, 추천\",\"서울 맛집 \"\"최고\"\"\",\"['서울', '맛집', '추천']\"\n",
            "\n",
            "1,부산 여행,\"바다\n구경\",\"['부산', '바다', '구경']\"\n",
            "2,빈 글,,[]\n",
        );
        let lists = read_token_table(Cursor::new(csv)).unwrap();

        assert_eq!(
            lists,
            vec![
                vec!["서울", "맛집", "추천"],
                vec!["부산", "바다", "구경"],
                vec![],
            ]
        );
    }

    #[test]
    fn test_token_table_requires_named_column() {
        let csv = ",title,tokens\n0,서울,\"['서울', '맛집']\"\n";
        let err = read_token_table(Cursor::new(csv)).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::MissingField { ref field, .. } if field == "description_cleaned"
        ));
    }

    #[test]
    fn test_token_table_reports_bad_cells() {
        let unterminated = "description_cleaned\n\"['서울'\n";
        assert!(matches!(
            read_token_table(Cursor::new(unterminated)),
            Err(NetworkError::Parse(_))
        ));

        let not_a_list = "id,description_cleaned\n0,서울 맛집\n";
        let err = read_token_table(Cursor::new(not_a_list)).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_quoted_edge_list_fields() {
        let csv = "\"Source\",\"Target\",\"Weight\"\n\"서울\", \"맛집\" ,\"4\"\n";
        let pairs = read_edge_list(Cursor::new(csv)).unwrap();
        assert_eq!(pairs.get("서울", "맛집"), 4);
    }

    #[test]
    fn test_write_rejects_commas() {
        let table = FrequencyTable::aggregate(&[vec!["a,b"]]);
        assert!(write_frequency_table(Vec::new(), &table).is_err());
    }
}

//! Comma-separated values
//!
//! The first line holds the union of all record keys in first-seen order.
//! Strings are always quoted, with embedded quotes doubled. Nested objects and
//! arrays are written as quoted JSON. Numbers and booleans are written bare and
//! missing or null values as empty cells.
//!
//! Decoding reverses this: bare `true`/`false` become booleans, bare numbers
//! become numbers, empty bare cells become null and any cell holding a JSON
//! object or array becomes that structure. Quoted cells otherwise stay strings,
//! so `"12"` survives as text.
//!
//! A string that starts with `[`, `{` or `\` is written with one extra leading
//! `\` so it cannot be mistaken for nested JSON. Decoding strips it again.

use std::{iter::Peekable, mem, str::Chars};

use serde_json::{Number, Value};

use crate::codec::{CodecError, Record, TabularCodec};

/// CSV codec for flat records.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvCodec;

#[derive(Debug, Default)]
struct Cell {
    text: String,
    quoted: bool,
}

impl Cell {
    fn is_blank(&self) -> bool {
        !self.quoted && self.text.is_empty()
    }
}

impl TabularCodec for CsvCodec {
    fn encode(&self, records: &[Record]) -> Result<String, CodecError> {
        if records.is_empty() {
            return Ok(String::new());
        }

        let mut headers: Vec<&str> = Vec::new();

        for key in records.iter().flat_map(|record| record.keys()) {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }

        let mut lines = Vec::with_capacity(records.len() + 1);

        lines.push(
            headers
                .iter()
                .map(|header| encode_header(header))
                .collect::<Vec<_>>()
                .join(","),
        );

        for record in records {
            let cells = headers
                .iter()
                .map(|header| encode_value(record.get(*header)))
                .collect::<Result<Vec<_>, _>>()?;

            lines.push(cells.join(","));
        }

        Ok(lines.join("\n"))
    }

    fn decode(&self, text: &str) -> Result<Vec<Record>, CodecError> {
        let mut rows = parse_rows(text)?
            .into_iter()
            .filter(|row| !matches!(row.as_slice(), [cell] if cell.is_blank()));

        let Some(headers) = rows.next() else {
            return Ok(Vec::new());
        };

        let headers: Vec<String> = headers.into_iter().map(|cell| cell.text).collect();

        rows.enumerate()
            .map(|(index, row)| {
                let cells = row.len();

                if cells > headers.len() {
                    return Err(CodecError::RowTooLong {
                        row: index + 1,
                        cells,
                        headers: headers.len(),
                    });
                }

                let mut row = row.into_iter();

                Ok(headers
                    .iter()
                    .map(|header| (header.clone(), row.next().map_or(Value::Null, decode_cell)))
                    .collect())
            })
            .collect()
    }
}

const ESCAPE: char = '\\';

fn needs_quotes(text: &str) -> bool {
    text.contains([',', '"', '\n', '\r'])
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

fn encode_header(header: &str) -> String {
    if needs_quotes(header) {
        quote(header)
    } else {
        header.to_string()
    }
}

fn encode_value(value: Option<&Value>) -> Result<String, CodecError> {
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::String(text)) if text.starts_with(['[', '{', ESCAPE]) => {
            quote(&format!("{ESCAPE}{text}"))
        }
        Some(Value::String(text)) => quote(text),
        Some(nested @ (Value::Array(_) | Value::Object(_))) => {
            quote(&serde_json::to_string(nested)?)
        }
    })
}

fn parse_nested(text: &str) -> Option<Value> {
    if !(text.starts_with('{') || text.starts_with('[')) {
        return None;
    }

    serde_json::from_str(text).ok()
}

fn decode_cell(cell: Cell) -> Value {
    if let Some(literal) = cell.text.strip_prefix(ESCAPE) {
        return Value::String(literal.to_string());
    }

    if let Some(nested) = parse_nested(&cell.text) {
        return nested;
    }

    if cell.quoted {
        return Value::String(cell.text);
    }

    match cell.text.as_str() {
        "" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        text => serde_json::from_str::<Number>(text)
            .map_or_else(|_| Value::String(cell.text.clone()), Value::Number),
    }
}

fn parse_rows(text: &str) -> Result<Vec<Vec<Cell>>, CodecError> {
    let mut parser = Parser {
        chars: text.chars().peekable(),
        line: 1,
    };

    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut cell = Cell::default();

    while let Some(c) = parser.chars.next() {
        match c {
            '"' => {
                cell.quoted = true;
                parser.quoted(&mut cell.text)?;
            }
            ',' => row.push(mem::take(&mut cell)),
            '\r' if parser.chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(mem::take(&mut cell));
                rows.push(mem::take(&mut row));
                parser.line += 1;
            }
            _ => cell.text.push(c),
        }
    }

    if !row.is_empty() || !cell.is_blank() {
        row.push(cell);
        rows.push(row);
    }

    Ok(rows)
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl Parser<'_> {
    fn quoted(&mut self, out: &mut String) -> Result<(), CodecError> {
        let start = self.line;

        while let Some(c) = self.chars.next() {
            match c {
                '"' if self.chars.peek() == Some(&'"') => {
                    self.chars.next();
                    out.push('"');
                }
                '"' => return Ok(()),
                '\n' => {
                    self.line += 1;
                    out.push(c);
                }
                _ => out.push(c),
            }
        }

        Err(CodecError::UnterminatedQuote { line: start })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => Record::new(),
        }
    }

    #[test]
    fn empty_input_encodes_to_empty_text() -> TestResult {
        assert_eq!(CsvCodec.encode(&[])?, "");
        assert!(CsvCodec.decode("")?.is_empty(), "empty text has no records");

        Ok(())
    }

    #[test]
    fn encodes_header_and_typed_cells() -> TestResult {
        let records = vec![
            record(json!({"order_id": 1, "note": "say \"hi\"", "paid": true})),
            record(json!({"order_id": 2, "extra": null})),
        ];

        let text = CsvCodec.encode(&records)?;

        assert_eq!(
            text,
            "note,order_id,paid,extra\n\"say \"\"hi\"\"\",1,true,\n,2,,"
        );

        Ok(())
    }

    #[test]
    fn nested_values_are_quoted_json() -> TestResult {
        let records = vec![record(json!({"items": [{"product_id": 3, "quantity": 2}]}))];

        let text = CsvCodec.encode(&records)?;

        assert_eq!(
            text,
            "items\n\"[{\"\"product_id\"\":3,\"\"quantity\"\":2}]\""
        );

        Ok(())
    }

    #[test]
    fn decodes_types_back() -> TestResult {
        let text = "id,name,code,active,total,items,missing\n\
                    7,\"Latte, large\",\"12\",false,4.5,\"[1,2]\",";

        let records = CsvCodec.decode(text)?;

        assert_eq!(
            records,
            vec![record(json!({
                "id": 7,
                "name": "Latte, large",
                "code": "12",
                "active": false,
                "total": 4.5,
                "items": [1, 2],
                "missing": null,
            }))]
        );

        Ok(())
    }

    #[test]
    fn json_looking_strings_are_escaped() -> TestResult {
        let records = vec![record(json!({"name": "[1]", "items": [1]}))];

        let text = CsvCodec.encode(&records)?;

        assert_eq!(text, "items,name\n\"[1]\",\"\\[1]\"");
        assert_eq!(CsvCodec.decode(&text)?, records);

        Ok(())
    }

    #[test]
    fn quoted_cells_may_span_lines() -> TestResult {
        let text = "notes,qty\r\n\"extra hot\nno foam\",1\r\n";

        let records = CsvCodec.decode(text)?;

        assert_eq!(
            records,
            vec![record(json!({"notes": "extra hot\nno foam", "qty": 1}))]
        );

        Ok(())
    }

    #[test]
    fn short_rows_are_padded_with_null() -> TestResult {
        let records = CsvCodec.decode("a,b\n1")?;

        assert_eq!(records, vec![record(json!({"a": 1, "b": null}))]);

        Ok(())
    }

    #[test]
    fn long_rows_are_rejected() {
        let result = CsvCodec.decode("a\n1,2");

        assert!(
            matches!(result, Err(CodecError::RowTooLong { row: 1, cells: 2, headers: 1 })),
            "expected RowTooLong, got {result:?}"
        );
    }

    #[test]
    fn unterminated_quotes_are_rejected() {
        let result = CsvCodec.decode("a\n\"open");

        assert!(
            matches!(result, Err(CodecError::UnterminatedQuote { line: 2 })),
            "expected UnterminatedQuote, got {result:?}"
        );
    }

    #[test]
    fn encode_then_decode_preserves_records() -> TestResult {
        let records = vec![
            record(json!({
                "order_id": 0,
                "date": "2024-05-01T10:00:00Z",
                "points_earned": 0,
                "points_used": 50,
                "redemption_code": "REDEEM-AB12CD",
                "reward_name": "Free Coffee",
            })),
            record(json!({
                "order_id": 17,
                "date": "2024-04-30T09:00:00Z",
                "points_earned": 12,
                "points_used": 0,
                "redemption_code": null,
                "reward_name": null,
            })),
            record(json!({
                "order_id": 18,
                "points_earned": 1,
                "points_used": 0,
                "reward_name": "[1]",
                "redemption_code": "{\"a\":1}",
                "date": "\\server\\share",
            })),
        ];

        let decoded = CsvCodec.decode(&CsvCodec.encode(&records)?)?;

        assert_eq!(decoded, records);

        Ok(())
    }
}

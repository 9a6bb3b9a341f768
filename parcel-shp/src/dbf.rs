//! Reader and writer of dBASE III (`.dbf`) attribute tables.
//!
//! Supported field types are `C` (character) for text fields and `N`/`F` (numeric) for number fields. `L` (logical)
//! and `D` (date) fields are read as text. Blank values are read as [`Value::Null`], so an empty string does not
//! survive a write/read cycle: it becomes `Null`.
//!
//! Text is written as UTF-8.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use parcel_types::feature::{AttributeTable, Field, FieldType, Schema, Value};

use crate::error::ParcelShpError;

const HEADER_LENGTH: usize = 32;
const DESCRIPTOR_LENGTH: usize = 32;
const HEADER_TERMINATOR: u8 = 0x0D;
const END_OF_FILE: u8 = 0x1A;
const VERSION: u8 = 0x03;

const MAX_NAME_LENGTH: usize = 10;
const MAX_TEXT_LENGTH: usize = 254;
const MAX_PLAIN_NUMBER_LENGTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
enum DbfType {
    Character,
    Numeric,
    Logical,
    Date,
}

impl DbfType {
    fn from_code(code: u8) -> Option<Self> {
        match code {
            b'C' => Some(DbfType::Character),
            b'N' | b'F' => Some(DbfType::Numeric),
            b'L' => Some(DbfType::Logical),
            b'D' => Some(DbfType::Date),
            _ => None,
        }
    }

    fn field_type(self) -> FieldType {
        match self {
            DbfType::Numeric => FieldType::Number,
            DbfType::Character | DbfType::Logical | DbfType::Date => FieldType::Text,
        }
    }
}

struct Column {
    dbf_type: DbfType,
    length: usize,
}

fn dbf_error(offset: usize, reason: impl Into<String>) -> ParcelShpError {
    ParcelShpError::Dbf {
        offset,
        reason: reason.into(),
    }
}

/// Decodes a `.dbf` file into an attribute table. Records marked as deleted are kept, so that rows stay aligned with
/// the records of the `.shp` file.
pub fn decode<B: Buf>(mut buffer: B) -> Result<AttributeTable, ParcelShpError> {
    let data = buffer.copy_to_bytes(buffer.remaining());
    if data.len() < HEADER_LENGTH {
        return Err(dbf_error(0, "unexpected end of data reading file header"));
    }

    if data[0] & 0x07 != VERSION {
        log::debug!("Reading dbf file with unexpected version byte {:#04x}", data[0]);
    }

    let record_count = u32::from_le_bytes([data[4], data[5], data[6], data[7]]) as usize;
    let header_length = u16::from_le_bytes([data[8], data[9]]) as usize;
    let record_length = u16::from_le_bytes([data[10], data[11]]) as usize;

    let mut fields = vec![];
    let mut columns = vec![];
    let mut offset = HEADER_LENGTH;
    loop {
        match data.get(offset) {
            Some(&HEADER_TERMINATOR) => break,
            Some(_) if offset + DESCRIPTOR_LENGTH <= data.len() => {}
            _ => {
                return Err(dbf_error(
                    offset,
                    "unexpected end of data reading field descriptors",
                ))
            }
        }

        let descriptor = &data[offset..offset + DESCRIPTOR_LENGTH];
        let name_bytes = &descriptor[..11];
        let name_end = name_bytes.iter().position(|&b| b == 0).unwrap_or(11);
        let name = std::str::from_utf8(&name_bytes[..name_end])
            .map_err(|_| dbf_error(offset, "field name is not valid UTF-8"))?
            .trim_end()
            .to_string();

        let dbf_type = DbfType::from_code(descriptor[11]).ok_or_else(|| {
            dbf_error(
                offset + 11,
                format!(
                    "unsupported type '{}' of field '{name}'",
                    descriptor[11].escape_ascii()
                ),
            )
        })?;

        fields.push(Field::new(name, dbf_type.field_type()));
        columns.push(Column {
            dbf_type,
            length: descriptor[16] as usize,
        });
        offset += DESCRIPTOR_LENGTH;
    }

    if header_length < offset + 1 || header_length > data.len() {
        return Err(dbf_error(8, format!("invalid header length {header_length}")));
    }

    let expected_record_length = 1 + columns.iter().map(|c| c.length).sum::<usize>();
    if record_length != expected_record_length {
        return Err(dbf_error(
            10,
            format!("record length {record_length} does not match field lengths ({expected_record_length})"),
        ));
    }

    let schema = Schema::new(fields).map_err(|err| dbf_error(HEADER_LENGTH, err.to_string()))?;

    let records_end = record_count
        .checked_mul(record_length)
        .and_then(|length| length.checked_add(header_length));
    if records_end.map_or(true, |end| end > data.len()) {
        return Err(dbf_error(
            4,
            format!("{record_count} records of {record_length} bytes do not fit into {} bytes of data", data.len()),
        ));
    }

    let mut rows = Vec::with_capacity(record_count);
    for index in 0..record_count {
        let start = header_length + index * record_length;
        let record = data
            .get(start..start + record_length)
            .ok_or_else(|| dbf_error(start, format!("unexpected end of data reading record {index}")))?;

        match record[0] {
            b' ' => {}
            b'*' => log::debug!("Record {index} is marked as deleted"),
            flag => log::debug!("Record {index} has unknown deletion flag {flag:#04x}"),
        }

        let mut row = Vec::with_capacity(columns.len());
        let mut value_offset = 1;
        for column in &columns {
            let raw = &record[value_offset..value_offset + column.length];
            row.push(decode_value(column.dbf_type, raw, start + value_offset)?);
            value_offset += column.length;
        }

        rows.push(row);
    }

    let table = AttributeTable::with_rows(schema, rows)
        .map_err(|err| dbf_error(header_length, err.to_string()))?;

    log::debug!(
        "Decoded dbf table with {} fields and {} records",
        table.schema().len(),
        table.len()
    );

    Ok(table)
}

fn decode_value(dbf_type: DbfType, raw: &[u8], offset: usize) -> Result<Value, ParcelShpError> {
    let text = match std::str::from_utf8(raw) {
        Ok(text) => text.to_string(),
        Err(_) => {
            log::debug!("Value at byte {offset} is not valid UTF-8, replacing invalid characters");
            String::from_utf8_lossy(raw).into_owned()
        }
    };
    let text = text.trim_end_matches([' ', '\0']);

    match dbf_type {
        DbfType::Character | DbfType::Date => {
            if text.is_empty() {
                Ok(Value::Null)
            } else {
                Ok(Value::Text(text.to_string()))
            }
        }
        DbfType::Logical => match text.trim() {
            "" | "?" => Ok(Value::Null),
            v => Ok(Value::Text(v.to_string())),
        },
        DbfType::Numeric => match text.trim() {
            "" => Ok(Value::Null),
            v => v
                .parse::<f64>()
                .map(Value::Number)
                .map_err(|_| dbf_error(offset, format!("invalid number '{v}'"))),
        },
    }
}

/// Encodes the table into a `.dbf` file.
///
/// Fails if a field name is longer than 10 bytes, or a text value is longer than 254 bytes.
///
/// Values are padded with spaces to the width of their column, so trailing spaces of text values do not survive
/// [`decode`], and empty text values are decoded as [`Value::Null`].
pub fn encode(table: &AttributeTable) -> Result<Bytes, ParcelShpError> {
    let fields = table.schema().fields();

    let mut columns = Vec::with_capacity(fields.len());
    for (index, field) in fields.iter().enumerate() {
        let name = field.name().as_bytes();
        if name.len() > MAX_NAME_LENGTH || name.contains(&0) {
            return Err(ParcelShpError::Unencodable(format!(
                "field name '{}' is longer than {MAX_NAME_LENGTH} bytes or contains NUL",
                field.name()
            )));
        }

        let values: Vec<Option<String>> = table
            .rows()
            .map(|row| match &row.values()[index] {
                Value::Null => None,
                Value::Text(v) => Some(v.clone()),
                Value::Number(v) => Some(format_number(*v)),
            })
            .collect();

        let length = values
            .iter()
            .flatten()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max(1);
        if length > MAX_TEXT_LENGTH {
            return Err(ParcelShpError::Unencodable(format!(
                "value of field '{}' is longer than {MAX_TEXT_LENGTH} bytes",
                field.name()
            )));
        }

        let decimals = match field.field_type() {
            FieldType::Text => 0,
            FieldType::Number => values
                .iter()
                .flatten()
                .filter(|v| !v.contains('e'))
                .filter_map(|v| v.split_once('.').map(|(_, fraction)| fraction.len()))
                .max()
                .unwrap_or(0)
                .min(length.saturating_sub(2)),
        };

        columns.push((field, length, decimals, values));
    }

    let header_length = HEADER_LENGTH + DESCRIPTOR_LENGTH * fields.len() + 1;
    let record_length = 1 + columns.iter().map(|(_, length, ..)| length).sum::<usize>();
    let (Ok(header_length_u16), Ok(record_length_u16), Ok(record_count)) = (
        u16::try_from(header_length),
        u16::try_from(record_length),
        u32::try_from(table.len()),
    ) else {
        return Err(ParcelShpError::Unencodable(
            "table is too large for the dbf format".into(),
        ));
    };

    let mut buf = BytesMut::with_capacity(header_length + record_length * table.len() + 1);

    buf.put_u8(VERSION);
    // Date of the last update: 1970-01-01, so that the output does not depend on the current date.
    buf.put_slice(&[70, 1, 1]);
    buf.put_u32_le(record_count);
    buf.put_u16_le(header_length_u16);
    buf.put_u16_le(record_length_u16);
    buf.put_bytes(0, 20);

    for (field, length, decimals, _) in &columns {
        let name = field.name().as_bytes();
        buf.put_slice(name);
        buf.put_bytes(0, 11 - name.len());
        buf.put_u8(match field.field_type() {
            FieldType::Text => b'C',
            FieldType::Number => b'N',
        });
        buf.put_bytes(0, 4);
        buf.put_u8(*length as u8);
        buf.put_u8(*decimals as u8);
        buf.put_bytes(0, 14);
    }
    buf.put_u8(HEADER_TERMINATOR);

    for row in 0..table.len() {
        buf.put_u8(b' ');
        for (field, length, _, values) in &columns {
            let value = values[row].as_deref().unwrap_or("").as_bytes();
            let padding = length - value.len();
            match field.field_type() {
                FieldType::Text => {
                    buf.put_slice(value);
                    buf.put_bytes(b' ', padding);
                }
                FieldType::Number => {
                    buf.put_bytes(b' ', padding);
                    buf.put_slice(value);
                }
            }
        }
    }
    buf.put_u8(END_OF_FILE);

    Ok(buf.freeze())
}

/// Shortest representation that reads back as the same number. Very large and very small numbers use exponent
/// notation.
fn format_number(value: f64) -> String {
    let plain = value.to_string();
    if plain.len() > MAX_PLAIN_NUMBER_LENGTH {
        format!("{value:e}")
    } else {
        plain
    }
}

//! Reading point features from CSV tables with coordinate columns.

use std::io::Read;
use std::path::Path;

use parcel_types::feature::{AttributeTable, FeatureCollection, Field, FieldType, Schema, Value};
use parcel_types::geo::Crs;
use parcel_types::Point2d;

use crate::error::ParcelError;

/// Reader of point features from CSV tables.
///
/// Each row with valid coordinates becomes a point feature, and all columns except the coordinates become its
/// attributes. Rows with a missing or unparsable coordinate are skipped, as points of a feature collection must have
/// finite coordinates.
///
/// The type of each attribute column is decided once for the whole table: a column is a number column if every
/// non-empty value in it is a number, otherwise it is a text column. Empty values are read as `Null`. Columns with a
/// blank name are named by their position: `column_1` for the first column of the table and so on.
///
/// ```
/// use parcel::table::PointTableReader;
/// use parcel::geo::Crs;
///
/// let csv = "name,lon,lat\nTartine,-122.4241,37.7614\nUnknown,,\n";
/// let restaurants = PointTableReader::new(Crs::WGS84)
///     .with_coordinate_columns("lon", "lat")
///     .read(csv.as_bytes())
///     .unwrap();
///
/// assert_eq!(restaurants.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct PointTableReader {
    crs: Crs,
    x_column: String,
    y_column: String,
    text_columns: Vec<String>,
    delimiter: u8,
}

impl PointTableReader {
    /// Creates a reader of comma separated tables with `longitude` and `latitude` columns. Points are tagged with
    /// `crs`.
    pub fn new(crs: Crs) -> Self {
        Self {
            crs,
            x_column: "longitude".into(),
            y_column: "latitude".into(),
            text_columns: vec![],
            delimiter: b',',
        }
    }

    /// Sets the names of the columns with X (longitude) and Y (latitude) coordinates.
    pub fn with_coordinate_columns(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_column = x.into();
        self.y_column = y.into();
        self
    }

    /// Reads the column as text even if all its values are numbers. Useful for identifiers and codes.
    pub fn with_text_column(mut self, name: impl Into<String>) -> Self {
        self.text_columns.push(name.into());
        self
    }

    /// Sets the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Reads features from a file.
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<FeatureCollection<Point2d>, ParcelError> {
        let file = std::fs::File::open(path)?;
        self.read(file)
    }

    /// Reads features from CSV data. The first row must contain column names.
    pub fn read<R: Read>(&self, reader: R) -> Result<FeatureCollection<Point2d>, ParcelError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let column_index = |name: &str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or_else(|| ParcelError::MissingField(name.to_string()))
        };
        let x_index = column_index(&self.x_column)?;
        let y_index = column_index(&self.y_column)?;

        let mut points = vec![];
        let mut records = vec![];
        let mut dropped = 0;
        for record in reader.records() {
            let record = record?;
            match (parse_number(record.get(x_index)), parse_number(record.get(y_index))) {
                (Some(x), Some(y)) => {
                    points.push(Point2d::new(x, y));
                    records.push(record);
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            log::warn!("Dropped {dropped} rows without valid coordinates");
        }

        let attribute_columns: Vec<usize> = (0..headers.len())
            .filter(|&index| index != x_index && index != y_index)
            .collect();

        let fields = attribute_columns
            .iter()
            .map(|&index| {
                let name = match &headers[index] {
                    "" => format!("column_{}", index + 1),
                    name => name.to_string(),
                };
                let is_number = !self.text_columns.contains(&name)
                    && records.iter().all(|record| match record.get(index) {
                        None | Some("") => true,
                        value => parse_number(value).is_some(),
                    });

                Field::new(
                    name,
                    if is_number {
                        FieldType::Number
                    } else {
                        FieldType::Text
                    },
                )
            })
            .collect::<Vec<_>>();

        let rows = records.iter().map(|record| {
            attribute_columns
                .iter()
                .zip(&fields)
                .map(|(&index, field)| match (record.get(index), field.field_type()) {
                    (None | Some(""), _) => Value::Null,
                    (value, FieldType::Number) => parse_number(value).map_or(Value::Null, Value::Number),
                    (Some(value), FieldType::Text) => Value::Text(value.to_string()),
                })
                .collect()
        });

        let attributes = AttributeTable::with_rows(Schema::new(fields.clone())?, rows)?;

        log::debug!(
            "Read {} points with {} attribute fields",
            points.len(),
            attributes.schema().len()
        );

        Ok(FeatureCollection::new(self.crs.clone(), points, attributes)?)
    }
}

fn parse_number(value: Option<&str>) -> Option<f64> {
    value?.parse::<f64>().ok().filter(|v| v.is_finite())
}

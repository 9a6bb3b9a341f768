use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::ParcelTypesError;

/// Type of values stored in an attribute field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// UTF-8 string.
    Text,
    /// Finite floating point number.
    Number,
}

/// Named, typed attribute field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    name: String,
    field_type: FieldType,
}

impl Field {
    /// Creates a new field.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    /// Shortcut for a [`FieldType::Text`] field.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    /// Shortcut for a [`FieldType::Number`] field.
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    /// Name of the field.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type of the field.
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }
}

/// Ordered set of fields of an [`AttributeTable`]. Field names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Field>", into = "Vec<Field>")]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Creates a new schema. Fails if any of the field names is empty or used more than once.
    pub fn new(fields: Vec<Field>) -> Result<Self, ParcelTypesError> {
        for (index, field) in fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(ParcelTypesError::Attribute(format!(
                    "field {index} has empty name"
                )));
            }

            if fields[..index].iter().any(|f| f.name == field.name) {
                return Err(ParcelTypesError::Attribute(format!(
                    "duplicate field name '{}'",
                    field.name
                )));
            }
        }

        Ok(Self { fields })
    }

    /// Fields of the schema.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of the field with the given name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Field with the given name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn check_value(&self, index: usize, value: &Value) -> Result<(), ParcelTypesError> {
        let field = &self.fields[index];
        match (field.field_type, value) {
            (_, Value::Null) | (FieldType::Text, Value::Text(_)) => Ok(()),
            (FieldType::Number, Value::Number(v)) if v.is_finite() => Ok(()),
            (FieldType::Number, Value::Number(v)) => Err(ParcelTypesError::Attribute(format!(
                "value {v} of field '{}' is not finite",
                field.name
            ))),
            (expected, value) => Err(ParcelTypesError::Attribute(format!(
                "field '{}' expects {expected:?} values, got {value:?}",
                field.name
            ))),
        }
    }
}

impl TryFrom<Vec<Field>> for Schema {
    type Error = ParcelTypesError;

    fn try_from(value: Vec<Field>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Schema> for Vec<Field> {
    fn from(value: Schema) -> Self {
        value.fields
    }
}

/// Scalar attribute value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Missing value.
    #[default]
    Null,
    /// String value.
    Text(String),
    /// Numeric value.
    Number(f64),
}

impl Value {
    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// String value, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(v) => f.write_str(v),
            Value::Number(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Table of attribute values: one row per feature, one column per schema field.
///
/// The schema is fixed when the table is created and every value is checked against the type of its field. Adding a
/// column creates a new table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableData")]
pub struct AttributeTable {
    schema: Schema,
    rows: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
struct TableData {
    schema: Schema,
    rows: Vec<Vec<Value>>,
}

impl TryFrom<TableData> for AttributeTable {
    type Error = ParcelTypesError;

    fn try_from(value: TableData) -> Result<Self, Self::Error> {
        Self::with_rows(value.schema, value.rows)
    }
}

impl AttributeTable {
    /// Creates an empty table with the given schema.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            rows: vec![],
        }
    }

    /// Creates a table with no fields and `count` rows. Used for features that have no attributes.
    pub fn empty(count: usize) -> Self {
        Self {
            schema: Schema::default(),
            rows: vec![vec![]; count],
        }
    }

    /// Creates a table and fills it with the rows.
    pub fn with_rows(
        schema: Schema,
        rows: impl IntoIterator<Item = Vec<Value>>,
    ) -> Result<Self, ParcelTypesError> {
        let mut table = Self::new(schema);
        for row in rows {
            table.push_row(row)?;
        }

        Ok(table)
    }

    /// Adds a row to the end of the table.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), ParcelTypesError> {
        if row.len() != self.schema.len() {
            return Err(ParcelTypesError::Attribute(format!(
                "row {} has {} values, schema has {} fields",
                self.rows.len(),
                row.len(),
                self.schema.len()
            )));
        }

        for (index, value) in row.iter().enumerate() {
            self.schema.check_value(index, value)?;
        }

        self.rows.push(row);
        Ok(())
    }

    /// Schema of the table.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row with the given index.
    pub fn row(&self, index: usize) -> Option<Record<'_>> {
        self.rows.get(index).map(|values| Record {
            schema: &self.schema,
            values,
        })
    }

    /// Iterates over rows in order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = Record<'_>> {
        self.rows.iter().map(|values| Record {
            schema: &self.schema,
            values,
        })
    }

    /// Iterates over the values of the field with the given name. Returns `None` if there is no such field.
    pub fn column(&self, name: &str) -> Option<impl ExactSizeIterator<Item = &Value>> {
        let index = self.schema.index_of(name)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }

    /// Value of the field in the given row.
    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let index = self.schema.index_of(name)?;
        self.rows.get(row).map(|values| &values[index])
    }

    /// Returns a new table with an additional column at the end. The column must have a value for each row.
    pub fn with_column(
        &self,
        field: Field,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<Self, ParcelTypesError> {
        let mut fields = self.schema.fields.clone();
        fields.push(field);
        let schema = Schema::new(fields)?;
        let index = schema.len() - 1;

        let mut rows = Vec::with_capacity(self.rows.len());
        let mut values = values.into_iter();
        for row in &self.rows {
            let value = values.next().ok_or_else(|| {
                ParcelTypesError::Attribute(format!(
                    "column has fewer values than the table has rows ({})",
                    self.rows.len()
                ))
            })?;
            schema.check_value(index, &value)?;

            let mut row = row.clone();
            row.push(value);
            rows.push(row);
        }

        if values.next().is_some() {
            return Err(ParcelTypesError::Attribute(format!(
                "column has more values than the table has rows ({})",
                self.rows.len()
            )));
        }

        Ok(Self { schema, rows })
    }
}

/// A row of an [`AttributeTable`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record<'a> {
    schema: &'a Schema,
    values: &'a [Value],
}

impl<'a> Record<'a> {
    /// Value of the field with the given name.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.schema.index_of(name).map(|index| &self.values[index])
    }

    /// Values in the order of the schema fields.
    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    /// Iterates over `(field, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'a Field, &'a Value)> {
        self.schema.fields.iter().zip(self.values)
    }
}

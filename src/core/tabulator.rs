use crate::core::{ColumnPolicy, FieldValue, Record, Table};

/// Turns records with varying field sets into a rectangular table.
///
/// With [`ColumnPolicy::Fixed`] the header is the declared columns. With
/// [`ColumnPolicy::DeriveFromFirst`] the first record's fields, in order,
/// become the header and stay fixed: fields that only show up in later
/// records are dropped. Missing fields become empty cells. An empty input in
/// derive mode gives a table with no header and no rows.
pub fn build(records: &[Record], policy: &ColumnPolicy) -> Table {
    let header: Vec<String> = match policy {
        ColumnPolicy::Fixed(columns) => columns.clone(),
        ColumnPolicy::DeriveFromFirst => match records.first() {
            Some(first) => first.field_names().map(str::to_string).collect(),
            None => Vec::new(),
        },
    };

    let rows = records.iter().map(|record| row_for(record, &header)).collect();

    Table { header, rows }
}

fn row_for(record: &Record, header: &[String]) -> Vec<String> {
    header
        .iter()
        .map(|column| record.get(column).map(FieldValue::to_cell).unwrap_or_default())
        .collect()
}

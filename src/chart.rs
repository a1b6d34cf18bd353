use std::fmt;

use crate::query::{QueryResult, Value};

/// Storage type of a whole column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Numeric,
    Text,
}

/// Role a column plays when choosing a chart.
///
/// Date-likeness comes from the column name alone, so a date-like column
/// still carries its storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnClass {
    Numeric,
    Text,
    DateLike(DType),
}

impl ColumnClass {
    pub fn dtype(self) -> DType {
        match self {
            ColumnClass::Numeric => DType::Numeric,
            ColumnClass::Text => DType::Text,
            ColumnClass::DateLike(dtype) => dtype,
        }
    }

    pub fn is_numeric(self) -> bool {
        self.dtype() == DType::Numeric
    }

    pub fn is_text(self) -> bool {
        self.dtype() == DType::Text
    }

    pub fn is_date_like(self) -> bool {
        matches!(self, ColumnClass::DateLike(_))
    }
}

/// Numeric when every non-null cell is a number and at least one cell is
/// non-null. Anything else behaves like a text column.
pub fn column_dtype<'a>(values: impl IntoIterator<Item = &'a Value>) -> DType {
    let mut seen = false;
    for value in values {
        match value {
            Value::Null => {}
            Value::Integer(_) | Value::Real(_) => seen = true,
            Value::Text(_) | Value::Blob(_) => return DType::Text,
        }
    }

    if seen {
        DType::Numeric
    } else {
        DType::Text
    }
}

pub fn classify_columns(table: &QueryResult) -> Vec<ColumnClass> {
    table
        .columns
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let dtype = column_dtype(table.column_values(index));
            if name.to_lowercase().contains("date") {
                ColumnClass::DateLike(dtype)
            } else {
                match dtype {
                    DType::Numeric => ColumnClass::Numeric,
                    DType::Text => ColumnClass::Text,
                }
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoChartReason {
    NotEnoughData,
    Undetermined,
}

impl fmt::Display for NoChartReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoChartReason::NotEnoughData => write!(f, "Not enough data to build a chart."),
            NoChartReason::Undetermined => {
                write!(f, "Could not determine optimal chart type automatically.")
            }
        }
    }
}

/// Chosen visualization. Axes are column indices into the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartSelection {
    Line { x: usize, y: usize },
    Bar { x: usize, y: usize },
    Scatter { x: usize, y: usize },
    NoChart(NoChartReason),
}

impl ChartSelection {
    pub fn title(&self) -> Option<&'static str> {
        match self {
            ChartSelection::Line { .. } => Some("Time Series Analysis"),
            ChartSelection::Bar { .. } => Some("Category Analysis"),
            ChartSelection::Scatter { .. } => Some("Correlation"),
            ChartSelection::NoChart(_) => None,
        }
    }
}

/// Picks a chart from column classes alone. The first matching rule wins:
/// date-like + numeric gives a line, text + numeric a bar, two numerics a
/// scatter. Within a class the leftmost column is used.
pub fn select_chart(table: &QueryResult) -> ChartSelection {
    if table.is_empty() || table.columns.len() < 2 {
        return ChartSelection::NoChart(NoChartReason::NotEnoughData);
    }

    let classes = classify_columns(table);
    let positions = |keep: fn(ColumnClass) -> bool| -> Vec<usize> {
        classes
            .iter()
            .enumerate()
            .filter(|(_, class)| keep(**class))
            .map(|(index, _)| index)
            .collect()
    };

    let numeric = positions(ColumnClass::is_numeric);
    let text = positions(ColumnClass::is_text);
    let dates = positions(ColumnClass::is_date_like);

    match (dates.first(), text.first(), numeric.as_slice()) {
        (Some(&x), _, [y, ..]) => ChartSelection::Line { x, y: *y },
        (_, Some(&x), [y, ..]) => ChartSelection::Bar { x, y: *y },
        (_, _, [x, y, ..]) => ChartSelection::Scatter { x: *x, y: *y },
        _ => ChartSelection::NoChart(NoChartReason::Undetermined),
    }
}

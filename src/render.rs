//! Terminal rendering of query results and charts.

use unicode_width::UnicodeWidthStr;

use crate::chart::{ChartSelection, NoChartReason};
use crate::query::QueryResult;

const BAR_WIDTH: usize = 40;
const LINE_WIDTH: usize = 40;
const SCATTER_WIDTH: usize = 60;
const SCATTER_HEIGHT: usize = 16;

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

/// Scales `value` from `[min, max]` onto `0..=steps`.
fn scale(value: f64, min: f64, max: f64, steps: usize) -> usize {
    if max <= min {
        return 0;
    }
    let position = (value - min) / (max - min) * steps as f64;
    (position.round() as usize).min(steps)
}

pub fn render_table(table: &QueryResult) -> String {
    let cells: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();

    let widths: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .map(|(index, header)| {
            cells
                .iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.width())
                .chain(std::iter::once(header.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();

    let header: Vec<String> = table
        .columns
        .iter()
        .zip(&widths)
        .map(|(name, width)| pad(name, *width))
        .collect();
    out.push_str(header.join(" | ").trim_end());
    out.push('\n');

    let separator: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    out.push_str(&separator.join("-+-"));
    out.push('\n');

    if cells.is_empty() {
        out.push_str("(no rows)\n");
        return out;
    }

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad(cell, *width))
            .collect();
        out.push_str(line.join(" | ").trim_end());
        out.push('\n');
    }

    out
}

/// Renders the selected chart, or `None` when nothing was selected.
pub fn render_chart(selection: &ChartSelection, table: &QueryResult) -> Option<String> {
    let title = selection.title()?;
    let body = match *selection {
        ChartSelection::Line { x, y } => render_line(table, x, y),
        ChartSelection::Bar { x, y } => render_bar(table, x, y),
        ChartSelection::Scatter { x, y } => render_scatter(table, x, y),
        ChartSelection::NoChart(_) => return None,
    };

    Some(format!(
        "{}\n{}\n{}",
        title,
        "=".repeat(title.width()),
        body
    ))
}

/// The dashboard section printed under the result table. The heading shows
/// whenever the result had enough data to try a chart.
pub fn render_dashboard(selection: &ChartSelection, table: &QueryResult) -> String {
    let body = match (selection, render_chart(selection, table)) {
        (ChartSelection::NoChart(NoChartReason::NotEnoughData), _) => {
            return format!("{}\n", NoChartReason::NotEnoughData);
        }
        (_, Some(chart)) => chart,
        (ChartSelection::NoChart(reason), None) => format!("{}\n", reason),
        (_, None) => String::new(),
    };

    format!("### Generated Dashboard\n{}", body)
}

/// Rows whose y cell is numeric, as (label, value).
fn labelled_points(table: &QueryResult, x: usize, y: usize) -> Vec<(String, f64)> {
    table
        .rows
        .iter()
        .filter_map(|row| {
            let value = row.get(y)?.as_f64()?;
            let label = row.get(x).map(ToString::to_string).unwrap_or_default();
            Some((label, value))
        })
        .collect()
}

fn render_bar(table: &QueryResult, x: usize, y: usize) -> String {
    let points = labelled_points(table, x, y);
    let label_width = points.iter().map(|(label, _)| label.width()).max().unwrap_or(0);
    let max = points.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);

    let mut out = String::new();
    for (label, value) in &points {
        let length = scale(value.max(0.0), 0.0, max, BAR_WIDTH);
        out.push_str(&format!(
            "{} | {} {}\n",
            pad(label, label_width),
            "█".repeat(length),
            format_number(*value)
        ));
    }
    out.push_str(&format!("x: {}  y: {}\n", table.columns[x], table.columns[y]));
    out
}

fn render_line(table: &QueryResult, x: usize, y: usize) -> String {
    let points = labelled_points(table, x, y);
    let label_width = points.iter().map(|(label, _)| label.width()).max().unwrap_or(0);
    let min = points.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    let max = points.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);

    let mut out = String::new();
    for (label, value) in &points {
        let offset = scale(*value, min, max, LINE_WIDTH);
        out.push_str(&format!(
            "{} | {}●{} {}\n",
            pad(label, label_width),
            " ".repeat(offset),
            " ".repeat(LINE_WIDTH - offset),
            format_number(*value)
        ));
    }
    out.push_str(&format!("x: {}  y: {}\n", table.columns[x], table.columns[y]));
    out
}

fn render_scatter(table: &QueryResult, x: usize, y: usize) -> String {
    let points: Vec<(f64, f64)> = table
        .rows
        .iter()
        .filter_map(|row| Some((row.get(x)?.as_f64()?, row.get(y)?.as_f64()?)))
        .collect();

    let (x_min, x_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (px, _)| {
            (lo.min(*px), hi.max(*px))
        });
    let (y_min, y_max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, py)| {
            (lo.min(*py), hi.max(*py))
        });

    let mut grid = vec![vec![' '; SCATTER_WIDTH + 1]; SCATTER_HEIGHT + 1];
    for (px, py) in &points {
        let column = scale(*px, x_min, x_max, SCATTER_WIDTH);
        let row = SCATTER_HEIGHT - scale(*py, y_min, y_max, SCATTER_HEIGHT);
        grid[row][column] = '•';
    }

    let (top, bottom) = if points.is_empty() {
        (String::new(), String::new())
    } else {
        (format_number(y_max), format_number(y_min))
    };
    let gutter = top.width().max(bottom.width());

    let mut out = String::new();
    for (index, cells) in grid.iter().enumerate() {
        let label = match index {
            0 => top.as_str(),
            i if i == SCATTER_HEIGHT => bottom.as_str(),
            _ => "",
        };
        let line: String = cells.iter().collect();
        out.push_str(&format!("{:>gutter$} |{}\n", label, line.trim_end(), gutter = gutter));
    }
    out.push_str(&format!("{} +{}\n", " ".repeat(gutter), "-".repeat(SCATTER_WIDTH + 1)));

    if !points.is_empty() {
        let left = format_number(x_min);
        let right = format_number(x_max);
        let fill = (SCATTER_WIDTH + 1).saturating_sub(left.width() + right.width());
        out.push_str(&format!(
            "{}  {}{}{}\n",
            " ".repeat(gutter),
            left,
            " ".repeat(fill),
            right
        ));
    }
    out.push_str(&format!("x: {}  y: {}\n", table.columns[x], table.columns[y]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Value;

    fn category_totals() -> QueryResult {
        QueryResult::new(
            vec!["category".into(), "total".into()],
            vec![
                vec![Value::Text("Electronics".into()), Value::Integer(3625)],
                vec![Value::Text("Furniture".into()), Value::Integer(1250)],
            ],
        )
    }

    #[test]
    fn table_pads_columns_to_widest_cell() {
        let rendered = render_table(&category_totals());
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "category    | total");
        assert_eq!(lines[1], "------------+------");
        assert_eq!(lines[2], "Electronics | 3625");
        assert_eq!(lines[3], "Furniture   | 1250");
    }

    #[test]
    fn empty_table_says_so() {
        let table = QueryResult::new(vec!["category".into()], vec![]);
        assert!(render_table(&table).ends_with("(no rows)\n"));
    }

    #[test]
    fn nulls_render_as_null() {
        let table = QueryResult::new(vec!["a".into()], vec![vec![Value::Null]]);
        assert!(render_table(&table).contains("NULL"));
    }

    #[test]
    fn bar_scales_to_largest_value() {
        let rendered = render_chart(&ChartSelection::Bar { x: 0, y: 1 }, &category_totals())
            .expect("chart");

        assert!(rendered.starts_with("Category Analysis\n"));
        let electronics = rendered
            .lines()
            .find(|line| line.starts_with("Electronics"))
            .expect("row");
        assert_eq!(electronics.matches('█').count(), BAR_WIDTH);
        assert!(electronics.ends_with("3625"));

        let furniture = rendered
            .lines()
            .find(|line| line.starts_with("Furniture"))
            .expect("row");
        assert_eq!(furniture.matches('█').count(), 14);
    }

    #[test]
    fn line_places_markers_between_min_and_max() {
        let table = QueryResult::new(
            vec!["date".into(), "amount".into()],
            vec![
                vec![Value::Text("2023-01-15".into()), Value::Integer(100)],
                vec![Value::Text("2023-01-16".into()), Value::Integer(300)],
            ],
        );
        let rendered = render_chart(&ChartSelection::Line { x: 0, y: 1 }, &table).expect("chart");

        let first = rendered.lines().find(|l| l.starts_with("2023-01-15")).expect("row");
        let second = rendered.lines().find(|l| l.starts_with("2023-01-16")).expect("row");
        assert!(first.starts_with("2023-01-15 | ●"));
        assert!(second.contains(&format!("{}●", " ".repeat(LINE_WIDTH))));
    }

    #[test]
    fn scatter_plots_corners() {
        let table = QueryResult::new(
            vec!["amount".into(), "id".into()],
            vec![
                vec![Value::Integer(0), Value::Integer(0)],
                vec![Value::Integer(10), Value::Integer(5)],
            ],
        );
        let rendered =
            render_chart(&ChartSelection::Scatter { x: 0, y: 1 }, &table).expect("chart");

        assert!(rendered.starts_with("Correlation\n"));
        assert_eq!(rendered.matches('•').count(), 2);
        assert!(rendered.contains("5 |"));
        assert!(rendered.contains("x: amount  y: id"));
    }

    #[test]
    fn no_chart_renders_nothing() {
        let selection = ChartSelection::NoChart(NoChartReason::Undetermined);
        assert!(render_chart(&selection, &category_totals()).is_none());
    }

    #[test]
    fn dashboard_heading_precedes_undetermined_message() {
        let table = QueryResult::new(
            vec!["product_name".into(), "category".into()],
            vec![vec![Value::Text("Desk".into()), Value::Text("Furniture".into())]],
        );
        let rendered = render_dashboard(&ChartSelection::NoChart(NoChartReason::Undetermined), &table);

        assert_eq!(
            rendered,
            "### Generated Dashboard\nCould not determine optimal chart type automatically.\n"
        );
    }

    #[test]
    fn dashboard_without_enough_data_has_no_heading() {
        let table = QueryResult::new(vec!["total".into()], vec![vec![Value::Integer(1)]]);
        let rendered =
            render_dashboard(&ChartSelection::NoChart(NoChartReason::NotEnoughData), &table);

        assert_eq!(rendered, "Not enough data to build a chart.\n");
    }

    #[test]
    fn dashboard_wraps_the_chart() {
        let rendered = render_dashboard(&ChartSelection::Bar { x: 0, y: 1 }, &category_totals());

        assert!(rendered.starts_with("### Generated Dashboard\nCategory Analysis\n"));
    }
}

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use ehr_core::{CutoffTable, GraphSummary};
use ehr_model::{LabelValue, RecordType};

pub fn print_types(record_types: &[RecordType]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Record type"),
        header_cell("Time index"),
        header_cell("References"),
    ]);
    apply_table_style(&mut table);
    for record_type in record_types {
        let references: Vec<String> = record_type
            .relationships
            .iter()
            .map(|edge| {
                format!(
                    "{} -> {}.{}",
                    edge.child_key, edge.parent_entity, edge.parent_key
                )
            })
            .collect();
        table.add_row(vec![
            name_cell(&record_type.name),
            optional_cell(record_type.temporal_role.time_index()),
            if references.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(references.join("\n"))
            },
        ]);
    }
    println!("{table}");
}

pub fn print_graph(summary: &GraphSummary) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Identifier"),
        header_cell("Time index"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    let mut total_rows = 0usize;
    for entry in &summary.tables {
        total_rows += entry.rows;
        table.add_row(vec![
            name_cell(&entry.name),
            Cell::new(entry.rows),
            Cell::new(entry.columns),
            Cell::new(&entry.identifier),
            optional_cell(entry.time_index.as_deref()),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");

    if summary.edges.is_empty() {
        println!("No relationships.");
        return;
    }
    let mut edges = Table::new();
    edges.set_header(vec![header_cell("Parent"), header_cell("Child")]);
    apply_table_style(&mut edges);
    for edge in &summary.edges {
        edges.add_row(vec![
            Cell::new(format!("{}.{}", edge.parent_entity, edge.parent_key)),
            Cell::new(format!("{}.{}", edge.child_entity, edge.child_key)),
        ]);
    }
    println!();
    println!("Relationships:");
    println!("{edges}");
}

/// Summary of a cutoff run, written to stderr so stdout can carry the CSV.
pub fn print_cutoff_summary(problem: &str, cutoffs: &CutoffTable) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Problem"),
        header_cell("Records"),
        header_cell("Gaps"),
        header_cell("Positive"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    let positives = cutoffs
        .records
        .iter()
        .filter(|record| matches!(record.label, LabelValue::Bool(true)))
        .count();
    let has_flags = cutoffs
        .records
        .iter()
        .any(|record| matches!(record.label, LabelValue::Bool(_)));
    table.add_row(vec![
        name_cell(problem),
        Cell::new(cutoffs.len()),
        count_cell(cutoffs.gaps, Color::Yellow),
        if has_flags {
            Cell::new(positives)
        } else {
            dim_cell("-")
        },
    ]);
    eprintln!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn name_cell(name: &str) -> Cell {
    Cell::new(name)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

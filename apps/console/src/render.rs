//! Plain-text rendering of table and form snapshots.

use std::fmt::Write as _;

use cmms_application::{FieldState, FieldWidget, RenderedField, TableView};

const EMPTY_TABLE: &str = "(no records)";

pub fn render_table(view: &TableView) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{}", view.title);
    let _ = writeln!(output, "{}", view.subtitle);
    if let Some(error) = &view.error {
        let _ = writeln!(output, "error: {error}");
    }
    output.push('\n');

    if view.rows.is_empty() {
        output.push_str(EMPTY_TABLE);
        output.push('\n');
        return output;
    }

    let mut widths: Vec<usize> = view.headers.iter().map(|header| header.chars().count()).collect();
    for row in &view.rows {
        for (index, cell) in row.cells.iter().enumerate() {
            if let Some(width) = widths.get_mut(index) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    push_line(&mut output, &view.headers, &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    push_line(&mut output, &rule, &widths);
    for row in &view.rows {
        push_line(&mut output, &row.cells, &widths);
    }

    output
}

pub fn render_form(fields: &[RenderedField]) -> String {
    let mut output = String::new();

    for field in fields {
        let marker = if field.required { "*" } else { "" };
        let _ = write!(output, "{}{marker} ({})", field.label, field.name);
        match field.state {
            FieldState::Disabled => output.push_str(" [disabled]"),
            FieldState::Selected => {
                let _ = write!(output, " = {}", field.value);
            }
            FieldState::Empty => {}
        }
        output.push('\n');

        match &field.widget {
            FieldWidget::Input { input_type } => {
                let _ = writeln!(output, "    {input_type}");
            }
            FieldWidget::Suggest { suggestions } => {
                let _ = writeln!(output, "    suggestions: {}", suggestions.join(", "));
            }
            FieldWidget::Choice {
                placeholder,
                options,
            } => {
                let _ = writeln!(output, "    {placeholder}");
                for option in options {
                    let _ = writeln!(output, "    - {} => {}", option.label, option.value_text());
                }
            }
        }
    }

    output
}

fn push_line(output: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(index, width)| {
            let cell = cells.get(index).map(String::as_str).unwrap_or_default();
            format!("{cell:<width$}")
        })
        .collect();
    output.push_str(padded.join("  ").trim_end());
    output.push('\n');
}

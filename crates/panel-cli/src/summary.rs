use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use panel_core::{IrrEstimate, MarginTable, WaveReport};
use panel_model::{Diagnostic, Severity};

use panel_cli::types::{ColumnDistribution, IrrResult, PrepareResult};

pub fn print_prepare_summary(result: &PrepareResult) {
    match &result.output {
        Some(path) => println!("Output: {}", path.display()),
        None => println!("Output: (dry run, nothing written)"),
    }
    println!("Rows: {}  Columns: {}", result.rows, result.columns);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Wave"),
        header_cell("Stage"),
        header_cell("Before"),
        header_cell("After"),
        header_cell("Removed"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for wave in &result.report.waves {
        add_wave_rows(&mut table, wave);
    }
    table.add_row(vec![
        Cell::new("PANEL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new("merge"),
        Cell::new(result.report.crosswalk_rows),
        Cell::new(result.report.merged_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");

    print_flag_table(&result.report.waves);
    let diagnostics: Vec<&Diagnostic> = result.report.all_diagnostics().collect();
    print_diagnostic_table(&diagnostics);
    for observed in &result.distributions {
        let expected = result
            .margins
            .iter()
            .find(|margin| margin.column == observed.column);
        print_distribution(observed, expected);
    }
}

fn add_wave_rows(table: &mut Table, wave: &WaveReport) {
    for (index, stage) in wave.stages.iter().enumerate() {
        let wave_cell = if index == 0 {
            Cell::new(&wave.wave)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold)
        } else {
            dim_cell("")
        };
        table.add_row(vec![
            wave_cell,
            Cell::new(stage.stage),
            Cell::new(stage.rows_before),
            Cell::new(stage.rows_after),
            count_cell(stage.removed(), Color::Yellow),
        ]);
    }
}

fn print_flag_table(waves: &[WaveReport]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Wave"),
        header_cell("Speeders"),
        header_cell("Straightliners"),
        header_cell("Inattentive"),
        header_cell("Shared IPs"),
        header_cell("Duration bounds"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for wave in waves {
        let bounds = match wave.speed_bounds {
            Some((lower, upper)) => Cell::new(format!("{lower:.1} - {upper:.1}")),
            None => dim_cell("-"),
        };
        table.add_row(vec![
            Cell::new(&wave.wave)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            count_cell(wave.speeders, Color::Yellow),
            count_cell(wave.straightliners, Color::Yellow),
            count_cell(wave.inattentive, Color::Yellow),
            count_cell(wave.shared_ips, Color::Yellow),
            bounds,
        ]);
    }
    println!();
    println!("Quality flags:");
    println!("{table}");
}

fn print_diagnostic_table(diagnostics: &[&Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    let mut ordered = diagnostics.to_vec();
    ordered.sort_by(|a, b| b.severity.cmp(&a.severity));
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Kind"),
        header_cell("Column"),
        header_cell("Value"),
        header_cell("Count"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    align_column(&mut table, 4, CellAlignment::Right);
    for diagnostic in ordered {
        table.add_row(vec![
            severity_cell(diagnostic.severity),
            Cell::new(diagnostic.kind),
            optional_cell(diagnostic.column.as_deref()),
            optional_cell(diagnostic.value.as_deref()),
            diagnostic.count.map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(&diagnostic.message),
        ]);
    }
    println!();
    println!("Diagnostics:");
    println!("{table}");
}

fn print_distribution(observed: &ColumnDistribution, expected: Option<&MarginTable>) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Category"),
        header_cell("Count"),
        header_cell("Percent"),
        header_cell("Expected"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=3 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for share in &observed.shares {
        let expected_cell = expected
            .and_then(|margin| margin.rows.iter().find(|row| row.category == share.category))
            .map_or_else(|| dim_cell("-"), |row| Cell::new(format!("{:.1}", row.expected)));
        table.add_row(vec![
            Cell::new(&share.category),
            Cell::new(share.count),
            Cell::new(format!("{:.1}%", share.percent)),
            expected_cell,
        ]);
    }
    println!();
    println!("{}:", observed.column);
    println!("{table}");
}

pub fn print_irr_summary(result: &IrrResult) {
    let estimate = &result.outcome.estimate;
    println!("Input: {} ({} rows)", result.input.display(), result.rows);
    let mut table = Table::new();
    table.set_header(vec![header_cell("Statistic"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (label, value) in irr_rows(estimate, result.outcome.skipped_rows) {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    println!("{table}");
    for diagnostic in &result.outcome.diagnostics {
        eprintln!("warning: {}", diagnostic.message);
    }
}

fn irr_rows(estimate: &IrrEstimate, skipped_rows: usize) -> Vec<(&'static str, String)> {
    vec![
        ("Pairs", estimate.pairs().to_string()),
        ("Inconsistent", estimate.inconsistent_count.to_string()),
        ("Consistent", estimate.consistent_count.to_string()),
        ("Respondents", estimate.respondents.to_string()),
        ("Skipped rows", skipped_rows.to_string()),
        ("IRR", format!("{:.4}", estimate.irr)),
        ("Standard error", format!("{:.4}", estimate.standard_error)),
        (
            "95% CI",
            format!("[{:.4}, {:.4}]", estimate.ci_lower, estimate.ci_upper),
        ),
        ("Swap error", format!("{:.4}", estimate.swap_error)),
    ]
}

fn apply_table_style(table: &mut Table) {
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
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
        Severity::Info => Cell::new("INFO").fg(Color::DarkGrey),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn optional_cell(value: Option<&str>) -> Cell {
    value.map_or_else(|| dim_cell("-"), Cell::new)
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use ecom_cli::cleanup::CleanupReport;
use ecom_model::{
    AlertSeverity, CheckStatus, Grade, HealthStatus, IngestionSummary, MonitoringReport,
    QualityReport, TableLoadStatus, TransformationSummary,
};
use ecom_warehouse::WarehouseSummary;

pub fn print_ingestion(summary: &IngestionSummary) {
    let mut table = styled_table(&["Table", "Rows", "Status", "SHA-256"]);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Center);
    for (name, load) in &summary.tables_loaded {
        let status = match load.status {
            TableLoadStatus::Success => Cell::new("success").fg(Color::Green),
            TableLoadStatus::Failed => Cell::new("failed")
                .fg(Color::Red)
                .add_attribute(Attribute::Bold),
        };
        let digest = load
            .source_sha256
            .as_deref()
            .map_or_else(|| dim_cell("-"), |hash| Cell::new(&hash[..hash.len().min(12)]));
        table.add_row(vec![name_cell(name), Cell::new(load.rows_loaded), status, digest]);
    }
    total_row(&mut table, summary.total_rows(), 4);
    println!("Ingestion ({:.2}s):", summary.total_execution_time_seconds);
    println!("{table}");
}

pub fn print_transformation(summary: &TransformationSummary) {
    let mut table = styled_table(&["Entity", "Input", "Output", "Filtered", "Rejections"]);
    for index in 1..=3 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (entity, counts) in &summary.records_processed {
        let reasons = if counts.rejected_reasons.is_empty() {
            dim_cell("-")
        } else {
            let text = counts
                .rejected_reasons
                .iter()
                .map(|(reason, n)| format!("{reason}: {n}"))
                .collect::<Vec<_>>()
                .join(", ");
            Cell::new(text).fg(Color::Yellow)
        };
        table.add_row(vec![
            name_cell(entity.as_str()),
            Cell::new(counts.input),
            Cell::new(counts.output),
            count_cell(counts.filtered, Color::Yellow),
            reasons,
        ]);
    }
    println!("Transformation:");
    println!("{table}");
    println!(
        "Rejection rate: {:.2}%",
        summary.data_quality_post_transform.rejection_rate_percent
    );
}

pub fn print_quality(report: &QualityReport) {
    let mut table = styled_table(&["Check", "Status", "Violations", "Details"]);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    for (category, result) in &report.checks_performed {
        let status = match result.status {
            CheckStatus::Passed => Cell::new("passed").fg(Color::Green),
            CheckStatus::Failed => Cell::new("failed").fg(Color::Yellow),
            CheckStatus::Error => Cell::new("error")
                .fg(Color::Red)
                .add_attribute(Attribute::Bold),
        };
        let details = match &result.message {
            Some(message) => Cell::new(message).fg(Color::Red),
            None => {
                let failing: Vec<String> = result
                    .details
                    .iter()
                    .filter(|(_, n)| **n > 0)
                    .map(|(key, n)| format!("{key}: {n}"))
                    .collect();
                if failing.is_empty() {
                    dim_cell("-")
                } else {
                    Cell::new(failing.join(", "))
                }
            }
        };
        table.add_row(vec![
            name_cell(category.report_key()),
            status,
            count_cell(result.violations, Color::Yellow),
            details,
        ]);
    }
    println!("Data quality ({} layer):", report.target_layer);
    println!("{table}");
    let grade_color = match report.quality_grade {
        Grade::A | Grade::B => Color::Green,
        Grade::C | Grade::D => Color::Yellow,
        Grade::F => Color::Red,
    };
    let mut score = Table::new();
    score.add_row(vec![
        Cell::new("Score").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.2}", report.overall_quality_score)),
        Cell::new(report.quality_grade)
            .fg(grade_color)
            .add_attribute(Attribute::Bold),
    ]);
    println!("{score}");
}

pub fn print_warehouse(summary: &WarehouseSummary) {
    let mut table = styled_table(&["Table", "Rows"]);
    align_column(&mut table, 1, CellAlignment::Right);
    for (name, rows) in &summary.rows {
        table.add_row(vec![name_cell(name), Cell::new(rows)]);
    }
    println!("Warehouse (loaded {}):", summary.load_timestamp);
    println!("{table}");
}

pub fn print_monitoring(report: &MonitoringReport) {
    let mut table = styled_table(&["Check", "Status"]);
    align_column(&mut table, 1, CellAlignment::Center);
    for (check, body) in &report.checks {
        let status = body["status"].as_str().unwrap_or("-");
        let color = if status == "ok" { Color::Green } else { Color::Red };
        table.add_row(vec![name_cell(check), Cell::new(status).fg(color)]);
    }
    println!("Health:");
    println!("{table}");
    for alert in &report.alerts {
        let label = match alert.severity {
            AlertSeverity::Critical => "CRITICAL",
            AlertSeverity::Warning => "WARN",
        };
        eprintln!("- [{label}] {}: {}", alert.check, alert.message);
    }
    let health = match report.pipeline_health {
        HealthStatus::Healthy => "healthy",
        HealthStatus::Degraded => "degraded",
        HealthStatus::Critical => "critical",
    };
    println!("Overall health: {} ({health})", report.overall_health_score);
}

pub fn print_cleanup(report: &CleanupReport) {
    let verb = if report.dry_run { "Would delete" } else { "Deleted" };
    for path in &report.deleted {
        println!("{verb}: {}", path.display());
    }
    println!(
        "{verb} {} file(s), {} byte(s); kept {}",
        report.deleted.len(),
        report.bytes_freed,
        report.kept
    );
}

fn styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_header(headers.iter().copied().map(header_cell).collect::<Vec<_>>());
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    table
}

fn total_row(table: &mut Table, total: u64, columns: usize) {
    let mut row = vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total).add_attribute(Attribute::Bold),
    ];
    row.extend((2..columns).map(|_| dim_cell("-")));
    table.add_row(row);
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

fn count_cell(count: u64, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

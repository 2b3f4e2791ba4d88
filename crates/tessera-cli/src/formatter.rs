//! Output formatters for rows, models and block trees.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use tessera_core::{Block, ContentEntity, DynamicModel};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format the field rows of an entity, ordered by region and sort order.
    fn format_rows(&self, entity: &ContentEntity) -> String;

    /// Format a loaded model.
    fn format_model(&self, model: &DynamicModel) -> String;

    /// Format a block forest.
    fn format_blocks(&self, blocks: &[Block]) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

const ROW_HEADERS: [&str; 6] = ["id", "region", "field", "sort", "type", "value"];

fn sorted_rows(entity: &ContentEntity) -> Vec<[String; 6]> {
    let mut rows: Vec<_> = entity.fields.iter().collect();
    rows.sort_by(|a, b| {
        (a.region_id.as_str(), a.sort_order, a.field_id.as_str())
            .cmp(&(b.region_id.as_str(), b.sort_order, b.field_id.as_str()))
    });
    rows.into_iter()
        .map(|row| {
            [
                row.id.to_string(),
                row.region_id.clone(),
                row.field_id.clone(),
                row.sort_order.to_string(),
                row.type_name.clone(),
                row.value.clone(),
            ]
        })
        .collect()
}

/// Walk a forest depth-first, yielding each block with its depth.
fn walk<'a>(blocks: &'a [Block], depth: usize, out: &mut Vec<(usize, &'a Block)>) {
    for block in blocks {
        out.push((depth, block));
        walk(&block.items, depth + 1, out);
    }
}

fn block_fields(block: &Block) -> String {
    block
        .to_json()
        .get("fields")
        .map(|fields| fields.to_string())
        .unwrap_or_default()
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_rows(&self, entity: &ContentEntity) -> String {
        let mut table = Table::new();
        table.set_header(ROW_HEADERS.to_vec());

        let rows = sorted_rows(entity);
        let count = rows.len();
        for row in rows {
            table.add_row(row.into_iter().map(Cell::new).collect::<Vec<_>>());
        }

        format!(
            "{} ({})\n{}\n{} row(s)",
            entity.id, entity.type_id, table, count
        )
    }

    fn format_model(&self, model: &DynamicModel) -> String {
        let mut table = Table::new();
        table.set_header(vec!["region", "value"]);

        for id in model.region_ids() {
            let value = model
                .get(id)
                .map(|value| value.to_json().to_string())
                .unwrap_or_default();
            table.add_row(vec![Cell::new(id), Cell::new(value)]);
        }

        format!("{}\n{} region(s)", table, model.len())
    }

    fn format_blocks(&self, blocks: &[Block]) -> String {
        let mut ordered = Vec::new();
        walk(blocks, 0, &mut ordered);

        let mut table = Table::new();
        table.set_header(vec!["id", "type", "fields"]);
        for (depth, block) in &ordered {
            table.add_row(vec![
                Cell::new(block.id),
                Cell::new(format!("{}{}", "  ".repeat(*depth), block.type_name())),
                Cell::new(block_fields(block)),
            ]);
        }

        format!("{}\n{} block(s)", table, ordered.len())
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_rows(&self, entity: &ContentEntity) -> String {
        serde_json::to_string_pretty(entity).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_model(&self, model: &DynamicModel) -> String {
        serde_json::to_string_pretty(&serde_json::json!({
            "type": model.type_id,
            "regions": model.to_json(),
        }))
        .unwrap_or_else(|_| "{}".to_string())
    }

    fn format_blocks(&self, blocks: &[Block]) -> String {
        let tree: Vec<serde_json::Value> = blocks.iter().map(Block::to_json).collect();
        serde_json::to_string_pretty(&tree).unwrap_or_else(|_| "[]".to_string())
    }
}

/// CSV formatter.
pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format_rows(&self, entity: &ContentEntity) -> String {
        let mut output = ROW_HEADERS.join(",");
        output.push('\n');
        for row in sorted_rows(entity) {
            let cells: Vec<String> = row.iter().map(|cell| escape_csv(cell)).collect();
            output.push_str(&cells.join(","));
            output.push('\n');
        }
        output
    }

    fn format_model(&self, model: &DynamicModel) -> String {
        let mut output = String::from("region,value\n");
        for id in model.region_ids() {
            let value = model
                .get(id)
                .map(|value| value.to_json().to_string())
                .unwrap_or_default();
            output.push_str(&format!("{},{}\n", escape_csv(id), escape_csv(&value)));
        }
        output
    }

    fn format_blocks(&self, blocks: &[Block]) -> String {
        let mut ordered = Vec::new();
        walk(blocks, 0, &mut ordered);

        let mut output = String::from("id,depth,type,fields\n");
        for (depth, block) in ordered {
            output.push_str(&format!(
                "{},{},{},{}\n",
                block.id,
                depth,
                block.type_name(),
                escape_csv(&block_fields(block))
            ));
        }
        output
    }
}

/// Quote a CSV cell when it contains a separator, quote or line break.
fn escape_csv(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

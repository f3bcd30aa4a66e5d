use crate::analysis::Analysis;
use crate::core::Result;
use serde_json::{json, Map, Value};
use std::path::Path;

/// Rows as objects keyed by column name, plus the distribution and run stats.
pub fn to_json(analysis: &Analysis) -> Value {
    let columns = analysis.table.columns();
    let rows: Vec<Value> = analysis
        .table
        .rows()
        .iter()
        .map(|row| {
            let object: Map<String, Value> = columns
                .iter()
                .zip(row)
                .map(|(column, cell)| (column.clone(), Value::String(cell.clone())))
                .collect();
            Value::Object(object)
        })
        .collect();

    json!({
        "columns": columns,
        "rows": rows,
        "distribution": analysis.distribution.counts(),
        "total": analysis.distribution.total(),
        "chart": analysis.chart,
        "stats": {
            "items_processed": analysis.stats.items_processed,
            "total_time_ms": analysis.stats.total_time.as_secs_f64() * 1000.0,
            "items_per_second": analysis.stats.items_per_second(),
        },
    })
}

pub fn write_json(analysis: &Analysis, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &to_json(analysis))?;
    tracing::info!(path = %path.display(), "wrote JSON export");
    Ok(())
}

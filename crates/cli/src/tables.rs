//! Tabular views of a trace through polars.

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use specular::trace::GroupSummary;
use std::fs::File;
use std::path::Path;

/// One row per group: ids, level, gate endpoints, virtual source, distance.
pub fn nodes_frame(rows: &[GroupSummary]) -> Result<DataFrame> {
    let df = df!(
        "id" => rows.iter().map(|r| r.id.0 as u64).collect::<Vec<_>>(),
        "level" => rows.iter().map(|r| r.level as u64).collect::<Vec<_>>(),
        "parent" => rows.iter().map(|r| r.parent.map(|p| p.0 as u64)).collect::<Vec<_>>(),
        "occluder" => rows.iter().map(|r| r.occluder.map(|m| m.0 as u64)).collect::<Vec<_>>(),
        "gate_x1" => rows.iter().map(|r| r.gate[0].x).collect::<Vec<_>>(),
        "gate_y1" => rows.iter().map(|r| r.gate[0].y).collect::<Vec<_>>(),
        "gate_x2" => rows.iter().map(|r| r.gate[1].x).collect::<Vec<_>>(),
        "gate_y2" => rows.iter().map(|r| r.gate[1].y).collect::<Vec<_>>(),
        "source_x" => rows.iter().map(|r| r.virtual_source.x).collect::<Vec<_>>(),
        "source_y" => rows.iter().map(|r| r.virtual_source.y).collect::<Vec<_>>(),
        "travelled" => rows.iter().map(|r| r.travelled).collect::<Vec<_>>(),
        "frontier" => rows.iter().map(|r| r.frontier).collect::<Vec<_>>()
    )?;
    Ok(df)
}

/// Write as parquet when the path says so, CSV otherwise.
pub fn write_frame(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    if is_parquet(path) {
        ParquetWriter::new(&mut file).finish(df)?;
    } else {
        CsvWriter::new(&mut file).include_header(true).finish(df)?;
    }
    Ok(())
}

/// Per-level group counts and distance range of a written nodes table.
pub fn level_summary(path: &Path) -> Result<DataFrame> {
    let lf = if is_parquet(path) {
        LazyFrame::scan_parquet(path, ScanArgsParquet::default())?
    } else if path.extension().is_some_and(|e| e == "csv") {
        LazyCsvReader::new(path)
            .with_infer_schema_length(Some(100))
            .finish()?
    } else {
        bail!("unsupported table format: {}", path.display());
    };
    let df = lf
        .group_by([col("level")])
        .agg([
            len().alias("groups"),
            col("frontier").sum().alias("frontier"),
            col("travelled").min().alias("min_travelled"),
            col("travelled").max().alias("max_travelled"),
        ])
        .sort(["level"], SortMultipleOptions::default())
        .collect()?;
    Ok(df)
}

fn is_parquet(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "parquet")
}

#[cfg(test)]
mod tests {
    use super::*;
    use specular::prelude::*;
    use tempfile::tempdir;

    fn sample_rows() -> Vec<GroupSummary> {
        let model = Model::parse("0 0  4 0\n2 -1 2 1\n-10 3 10 3\n").unwrap();
        let cfg = TraceCfg::from_depth(0).unwrap();
        trace(model, &cfg, &NeverCancel).unwrap().summaries()
    }

    #[test]
    fn nodes_frame_has_one_row_per_group() {
        let df = nodes_frame(&sample_rows()).unwrap();
        assert_eq!(df.shape(), (3, 12));
        assert_eq!(df.column("parent").unwrap().null_count(), 1);
    }

    #[test]
    fn csv_and_parquet_round_trip_into_level_summary() {
        let dir = tempdir().unwrap();
        for name in ["nodes.csv", "nodes.parquet"] {
            let path = dir.path().join(name);
            let mut df = nodes_frame(&sample_rows()).unwrap();
            write_frame(&mut df, &path).unwrap();
            let summary = level_summary(&path).unwrap();
            assert_eq!(summary.height(), 2, "{name}");
        }
    }

    #[test]
    fn unknown_table_format_is_rejected() {
        assert!(level_summary(Path::new("nodes.txt")).is_err());
    }
}

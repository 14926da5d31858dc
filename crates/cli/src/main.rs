use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use specular::model::rand::{draw_model, RandomSceneCfg};
use specular::trace::{trace, CancelStatus, Deadline, NeverCancel, TraceCfg};
use specular::Model;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;
mod tables;

use provenance::{sibling, write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Trace specular reflection paths and write the results")]
struct Cmd {
    /// Log per-group expansion details
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Trace a model file; writes the trace JSON, a nodes table and provenance
    Run(RunArgs),
    /// Draw a random model and write it in the plain-text format
    Random(RandomArgs),
    /// Per-level summary of a nodes table written by `run`
    Inspect {
        #[arg(long)]
        nodes: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

#[derive(Args, Serialize)]
struct RunArgs {
    /// Model in the plain-text format, or JSON when the name ends in `.json`
    #[arg(long)]
    input: PathBuf,
    #[arg(long)]
    out: PathBuf,
    /// Deepest reflection level to expand; -1 is unlimited
    #[arg(long, default_value_t = 3, allow_negative_numbers = true)]
    depth: i64,
    /// Cancel the trace after this many milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,
    /// Skip groups whose expansion fails instead of aborting
    #[arg(long)]
    skip_failed: bool,
    /// Nodes table path (`.csv` or `.parquet`); defaults to `<out stem>.nodes.csv`
    #[arg(long)]
    nodes: Option<PathBuf>,
}

#[derive(Args, Serialize)]
struct RandomArgs {
    #[arg(long, default_value_t = 12)]
    mirrors: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    #[arg(long, default_value_t = 10.0)]
    extent: f64,
    #[arg(long)]
    out: PathBuf,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose { Level::DEBUG } else { Level::INFO };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .init();
    match cmd.action {
        Action::Run(args) => run(&args),
        Action::Random(args) => random(&args),
        Action::Inspect { nodes } => inspect(&nodes),
        Action::Report => report(),
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    Ok(())
}

fn read_model(path: &Path) -> Result<Model> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let model = if path.extension().is_some_and(|e| e == "json") {
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
    } else {
        Model::parse(&text).with_context(|| format!("parsing {}", path.display()))?
    };
    Ok(model)
}

fn run(args: &RunArgs) -> Result<()> {
    tracing::info!(input = %args.input.display(), out = %args.out.display(), depth = args.depth, "run");
    let model = read_model(&args.input)?;
    let cfg = TraceCfg {
        skip_failed: args.skip_failed,
        ..TraceCfg::from_depth(args.depth)?
    };
    let cancel: Box<dyn CancelStatus> = match args.time_limit_ms {
        Some(ms) => Box::new(Deadline::after(Duration::from_millis(ms))),
        None => Box::new(NeverCancel),
    };
    let result = trace(model, &cfg, cancel.as_ref())?;
    tracing::info!(
        rays = result.rays().len(),
        groups = result.tree().len(),
        frontier = result.frontier().len(),
        "trace done"
    );

    ensure_parent(&args.out)?;
    std::fs::write(&args.out, serde_json::to_vec_pretty(&result.report())?)
        .with_context(|| format!("writing {}", args.out.display()))?;

    let nodes_path = args
        .nodes
        .clone()
        .unwrap_or_else(|| sibling(&args.out, ".nodes.csv"));
    ensure_parent(&nodes_path)?;
    let mut nodes = tables::nodes_frame(&result.summaries())?;
    tables::write_frame(&mut nodes, &nodes_path)?;

    let payload = Payload::new(serde_json::to_value(args)?)
        .with_input(args.input.to_string_lossy());
    let prov = write_sidecar(&args.out, &[nodes_path], payload)?;
    tracing::info!(provenance = %prov.display(), "outputs written");
    Ok(())
}

fn random(args: &RandomArgs) -> Result<()> {
    tracing::info!(mirrors = args.mirrors, seed = args.seed, "random");
    let cfg = RandomSceneCfg {
        mirrors: args.mirrors,
        extent: args.extent,
        ..RandomSceneCfg::default()
    };
    let model = draw_model(&cfg, args.seed)?;
    ensure_parent(&args.out)?;
    let body = if args.out.extension().is_some_and(|e| e == "json") {
        serde_json::to_string_pretty(&model)?
    } else {
        model.to_text()
    };
    std::fs::write(&args.out, body).with_context(|| format!("writing {}", args.out.display()))?;
    write_sidecar(&args.out, &[], Payload::new(serde_json::to_value(args)?))?;
    Ok(())
}

fn inspect(nodes: &Path) -> Result<()> {
    let summary = tables::level_summary(nodes)?;
    println!("{summary}");
    Ok(())
}

fn report() -> Result<()> {
    let obj = serde_json::json!({
        "code_rev": provenance::current_git_rev(),
        "specular_version": specular::VERSION,
        "params": {},
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::tempdir;

    fn run_args(input: PathBuf, out: PathBuf, depth: i64) -> RunArgs {
        RunArgs {
            input,
            out,
            depth,
            time_limit_ms: None,
            skip_failed: false,
            nodes: None,
        }
    }

    #[test]
    fn run_writes_trace_nodes_and_provenance() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("scene.txt");
        std::fs::write(&input, "# blocker and ceiling\n0 0 4 0\n2 -1 2 1\n-10 3 10 3\n").unwrap();
        let out = dir.path().join("out/trace.json");
        run(&run_args(input, out.clone(), 1)).unwrap();

        let doc: Value = serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
        assert_eq!(doc["rays"].as_array().unwrap().len(), 1);
        assert_eq!(doc["expanded"], 3);
        assert!(dir.path().join("out/trace.nodes.csv").exists());
        let prov: Value = serde_json::from_slice(
            &std::fs::read(dir.path().join("out/trace.provenance.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(prov["params"]["depth"], 1);
    }

    #[test]
    fn random_then_run_from_json() {
        let dir = tempdir().unwrap();
        let scene = dir.path().join("scene.json");
        random(&RandomArgs {
            mirrors: 5,
            seed: 3,
            extent: 10.0,
            out: scene.clone(),
        })
        .unwrap();
        let model = read_model(&scene).unwrap();
        assert!(model.mirrors().len() <= 5);

        let out = dir.path().join("trace.json");
        let mut args = run_args(scene, out.clone(), 0);
        args.skip_failed = true;
        run(&args).unwrap();
        assert!(out.exists());
    }

    #[test]
    fn invalid_depth_is_reported() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("scene.txt");
        std::fs::write(&input, "0 0 1 1\n").unwrap();
        let err = run(&run_args(input, dir.path().join("t.json"), -3)).unwrap_err();
        assert!(err.to_string().contains("invalid depth"));
    }
}

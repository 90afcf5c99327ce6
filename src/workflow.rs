//! Command implementations.
//!
//! Each `run_*` maps one CLI command onto the library and prints the result.
//! Gaps and skipped downloads are normal output; only failures that leave the
//! command without an answer become errors.
use crate::acquire::{AcquisitionOutcome, DatasetAcquirer, HuggingFaceSource, SkipReason, DEFAULT_SENTINEL};
use crate::catalog::{AssetKind, TaskCatalog};
use crate::cli::{
    AcquireArgs, BenchmarksArgs, CatalogArgs, CheckArgs, InfoArgs, PathsArgs, ReplayArgs,
    SetRootArgs, SourceArgs, TasksArgs, VerifyArgs, VerifySelection,
};
use crate::paths::{AssetCategory, PathResolver};
use crate::replay::{self, dataset_info, REPLAY_FPS};
use crate::verify::{AssetStatus, AssetVerifier, VerificationReport};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub fn run_paths(args: PathsArgs) -> Result<()> {
    let paths = PathResolver::load().context("load asset roots")?;
    if args.json {
        #[derive(Serialize)]
        struct PathsOutput<'a> {
            config: &'a Path,
            overridden: bool,
            roots: &'a crate::paths::AssetRoots,
        }
        return print_json(&PathsOutput {
            config: paths.config_path(),
            overridden: paths.is_overridden(),
            roots: paths.roots(),
        });
    }
    print_roots(&paths);
    Ok(())
}

pub fn run_set_root(args: SetRootArgs) -> Result<()> {
    let mut paths = PathResolver::load().context("load asset roots")?;
    let root = if args.reset { None } else { args.root.as_deref() };
    paths
        .override_root(root)
        .with_context(|| format!("update {}", paths.config_path().display()))?;
    match root {
        Some(_) => println!("wrote {}", paths.config_path().display()),
        None => println!("using default asset roots"),
    }
    print_roots(&paths);
    Ok(())
}

pub fn run_benchmarks(args: BenchmarksArgs) -> Result<()> {
    let catalog = load_catalog(&args.catalog)?;
    let mut rows = Vec::new();
    for id in catalog.benchmark_ids() {
        rows.push((id.to_string(), catalog.get_num_tasks(id)?));
    }
    if args.json {
        let value: serde_json::Map<String, serde_json::Value> = rows
            .into_iter()
            .map(|(id, count)| (id, count.into()))
            .collect();
        return print_json(&value);
    }
    for (id, count) in rows {
        println!("{id:<16} {count} tasks");
    }
    Ok(())
}

pub fn run_tasks(args: TasksArgs) -> Result<()> {
    let catalog = load_catalog(&args.catalog)?;
    let tasks = catalog.tasks(&args.benchmark)?;
    if args.json {
        return print_json(&tasks);
    }
    for (index, task) in tasks.iter().enumerate() {
        println!("{index:>3} {}", task.name);
        println!("    language: {}", task.language);
        for kind in AssetKind::ALL {
            println!("    {kind}: {}", task.relative_path(kind).display());
        }
    }
    Ok(())
}

pub fn run_verify(args: VerifyArgs) -> Result<()> {
    let paths = PathResolver::load().context("load asset roots")?;
    let catalog = load_catalog(&args.selection.catalog)?;
    let report = verify(&paths, &catalog, &args.selection)?;
    if args.json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }
    let missing = report.missing().count();
    if args.strict && missing > 0 {
        return Err(anyhow!("{missing} assets missing for {}", report.benchmark_id));
    }
    Ok(())
}

pub fn run_acquire(args: AcquireArgs) -> Result<()> {
    let paths = PathResolver::load().context("load asset roots")?;
    let catalog = load_catalog(&args.selection.catalog)?;
    let (outcome, report) = acquire_and_reverify(&paths, &catalog, &args.selection, &args.source)?;
    if args.json {
        #[derive(Serialize)]
        struct AcquireOutput<'a> {
            acquisition: &'a AcquisitionOutcome,
            report: &'a VerificationReport,
        }
        print_json(&AcquireOutput {
            acquisition: &outcome,
            report: &report,
        })?;
    } else {
        print_outcome(&outcome);
        print_report(&report);
    }
    if let AcquisitionOutcome::Failed { reason } = outcome {
        return Err(anyhow!("dataset download failed: {reason}"));
    }
    Ok(())
}

pub fn run_info(args: InfoArgs) -> Result<()> {
    let container = replay::open_demo_file(&args.file)?;
    let info = dataset_info(container.as_ref())
        .with_context(|| format!("summarize {}", args.file.display()))?;
    if args.json {
        return print_json(&info);
    }
    println!("{}", args.file.display());
    println!(
        "{} episodes, {} frames",
        info.episodes.len(),
        info.total_frames
    );
    if let Some(stats) = info.frame_stats {
        println!(
            "episode length: min {}, max {}, mean {:.1}",
            stats.min, stats.max, stats.mean
        );
    }
    for episode in &info.episodes {
        println!(
            "  {:<10} {:>5} frames  [{}]",
            episode.id,
            episode.frames,
            episode.streams.join(", ")
        );
    }
    Ok(())
}

pub fn run_replay(args: ReplayArgs) -> Result<()> {
    let frames = replay::replay(&args.file, args.episode, &args.stream, &args.out)
        .with_context(|| format!("replay {}", args.file.display()))?;
    println!(
        "wrote {} ({frames} frames at {REPLAY_FPS} fps)",
        args.out.display()
    );
    Ok(())
}

/// Verify, acquire, re-verify, then optionally replay one demonstration.
pub fn run_check(args: CheckArgs) -> Result<()> {
    let paths = PathResolver::load().context("load asset roots")?;
    let catalog = load_catalog(&args.selection.catalog)?;

    let report = if args.offline {
        verify(&paths, &catalog, &args.selection)?
    } else {
        let (outcome, report) =
            acquire_and_reverify(&paths, &catalog, &args.selection, &args.source)?;
        print_outcome(&outcome);
        report
    };
    print_report(&report);

    if let Some(out) = args.replay_out.as_deref() {
        let demo = sample_demonstration(&paths, &catalog, &report, &args.source)?;
        let frames = replay::replay(&demo, 0, replay::DEFAULT_STREAM, out)
            .with_context(|| format!("replay {}", demo.display()))?;
        println!("replayed {} -> {} ({frames} frames)", demo.display(), out.display());
    }

    let missing = report.missing().count();
    if missing > 0 {
        return Err(anyhow!("{missing} assets still missing for {}", report.benchmark_id));
    }
    Ok(())
}

fn load_catalog(args: &CatalogArgs) -> Result<TaskCatalog> {
    let mut catalog = TaskCatalog::builtin();
    if let Some(path) = args.catalog.as_deref() {
        let added = catalog
            .load_manifest(path)
            .with_context(|| format!("load catalog {}", path.display()))?;
        tracing::debug!(manifest = %path.display(), benchmarks = added, "catalog manifest loaded");
    }
    Ok(catalog)
}

/// Requested kinds in first-seen order; none means all.
fn selected_kinds(selection: &VerifySelection) -> Vec<AssetKind> {
    if selection.categories.is_empty() {
        return AssetKind::ALL.to_vec();
    }
    let mut kinds = Vec::new();
    for &kind in &selection.categories {
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    kinds
}

fn verify(
    paths: &PathResolver,
    catalog: &TaskCatalog,
    selection: &VerifySelection,
) -> Result<VerificationReport> {
    let mut verifier = AssetVerifier::new(paths, catalog);
    if selection.no_fallback {
        verifier = verifier.with_fallback_suites(Vec::new());
    } else if !selection.fallback_suites.is_empty() {
        verifier = verifier.with_fallback_suites(selection.fallback_suites.clone());
    }
    let report = verifier.verify(&selection.benchmark, &selected_kinds(selection))?;
    Ok(report)
}

fn sentinel(source: &SourceArgs) -> Option<PathBuf> {
    if source.no_sentinel {
        return None;
    }
    Some(
        source
            .sentinel
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SENTINEL)),
    )
}

fn acquire_and_reverify(
    paths: &PathResolver,
    catalog: &TaskCatalog,
    selection: &VerifySelection,
    source: &SourceArgs,
) -> Result<(AcquisitionOutcome, VerificationReport)> {
    let before = verify(paths, catalog, selection)?;
    let dataset_id = source.dataset.as_deref().unwrap_or(&selection.benchmark);
    let acquirer = DatasetAcquirer::new(HuggingFaceSource::new(
        &source.endpoint,
        &source.repo,
        &source.revision,
    ))
    .with_sentinel(sentinel(source));
    let outcome = acquirer.acquire(paths.resolve(AssetCategory::Datasets), dataset_id, &before);
    let after = match outcome {
        AcquisitionOutcome::Downloaded { .. } => verify(paths, catalog, selection)?,
        _ => before,
    };
    Ok((outcome, after))
}

/// The sentinel demonstration if present, else the last task's demonstration
/// wherever verification found it.
fn sample_demonstration(
    paths: &PathResolver,
    catalog: &TaskCatalog,
    report: &VerificationReport,
    source: &SourceArgs,
) -> Result<PathBuf> {
    let datasets = paths.resolve(AssetCategory::Datasets);
    if let Some(sentinel) = sentinel(source).map(|rel| datasets.join(rel)) {
        if sentinel.is_file() {
            return Ok(sentinel);
        }
    }
    let tasks = catalog.tasks(&report.benchmark_id)?;
    let (index, task) = tasks
        .iter()
        .enumerate()
        .next_back()
        .ok_or_else(|| anyhow!("{} has no tasks", report.benchmark_id))?;
    let found = report.entries.iter().find_map(|entry| {
        if entry.task_index != index || entry.kind != AssetKind::Datasets {
            return None;
        }
        match &entry.status {
            AssetStatus::PresentInAlternateCategory { path, .. } => Some(path.clone()),
            _ => None,
        }
    });
    Ok(found.unwrap_or_else(|| paths.asset_path(task, AssetKind::Datasets)))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{text}");
    Ok(())
}

fn print_roots(paths: &PathResolver) {
    for category in AssetCategory::ALL {
        println!("{:<15} {}", format!("{category}:"), paths.resolve(category).display());
    }
    let source = if paths.is_overridden() { "override" } else { "default" };
    println!("{:<15} {} ({source})", "config:", paths.config_path().display());
}

fn print_outcome(outcome: &AcquisitionOutcome) {
    match outcome {
        AcquisitionOutcome::Skipped { reason } => match reason {
            SkipReason::NothingMissing => println!("acquire: skipped (no missing datasets)"),
            SkipReason::ManuallyPopulated { sentinel } => {
                println!("acquire: skipped (found {})", sentinel.display())
            }
            SkipReason::AlreadyPresent => println!("acquire: skipped (dataset already present)"),
        },
        AcquisitionOutcome::Downloaded { files } => {
            println!("acquire: downloaded {} files", files.len())
        }
        AcquisitionOutcome::Failed { reason } => println!("acquire: failed ({reason})"),
    }
}

fn print_report(report: &VerificationReport) {
    for entry in report.missing() {
        let note = entry
            .malformed
            .map(|issue| format!(" [malformed {}: {}]", issue.field, issue.reason))
            .unwrap_or_default();
        println!(
            "missing {:<11} task {:>2} {}: {}{note}",
            entry.kind,
            entry.task_index,
            entry.task_name,
            entry.expected_path.display()
        );
    }
    for entry in &report.entries {
        if let AssetStatus::PresentInAlternateCategory { alternate, path } = &entry.status {
            println!(
                "found   {:<11} task {:>2} {} under {alternate}: {}",
                entry.kind,
                entry.task_index,
                entry.task_name,
                path.display()
            );
        }
    }
    for summary in report.summary() {
        println!(
            "{}: {} {}: {} present, {} missing, {} alternate",
            report.benchmark_id,
            summary.kind,
            if summary.missing == 0 { "ok" } else { "incomplete" },
            summary.present,
            summary.missing,
            summary.alternate
        );
    }
}

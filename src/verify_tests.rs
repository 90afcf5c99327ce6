use super::*;
use crate::catalog::Benchmark;
use crate::test_support::{list_files, touch, Fixture};

fn libero_10_tasks(catalog: &TaskCatalog) -> Vec<TaskDescriptor> {
    catalog.tasks("libero_10").expect("libero_10 tasks").to_vec()
}

#[test]
fn fully_populated_benchmark_reports_every_asset_present() {
    let fixture = Fixture::new();
    let catalog = TaskCatalog::builtin();
    for task in libero_10_tasks(&catalog) {
        fixture.populate(&task, &AssetKind::ALL);
    }

    let report = AssetVerifier::new(&fixture.paths, &catalog)
        .verify("libero_10", &AssetKind::ALL)
        .expect("verify");

    assert_eq!(report.entries.len(), 30);
    assert!(report.is_complete());
    assert!(report
        .entries
        .iter()
        .all(|entry| entry.status == AssetStatus::Present));
}

#[test]
fn entries_follow_task_order_then_requested_kind_order() {
    let fixture = Fixture::new();
    let catalog = TaskCatalog::builtin();
    let kinds = [AssetKind::Datasets, AssetKind::TaskDefs];

    let report = AssetVerifier::new(&fixture.paths, &catalog)
        .verify("libero_goal", &kinds)
        .expect("verify");

    let names = catalog.get_task_names("libero_goal").expect("names");
    assert_eq!(report.entries.len(), names.len() * 2);
    for (position, entry) in report.entries.iter().enumerate() {
        assert_eq!(entry.task_index, position / 2);
        assert_eq!(entry.task_name, names[position / 2]);
        assert_eq!(entry.kind, kinds[position % 2]);
        assert!(entry.is_missing());
    }
    let summary = report.summary();
    assert_eq!(summary[0].kind, AssetKind::Datasets);
    assert_eq!(summary[0].missing, 10);
}

#[test]
fn dataset_under_alternate_suite_is_not_missing() {
    let fixture = Fixture::new();
    let catalog = TaskCatalog::builtin();
    let tasks = libero_10_tasks(&catalog);
    for task in &tasks[..9] {
        fixture.populate(task, &AssetKind::ALL);
    }
    let last = &tasks[9];
    fixture.populate(last, &[AssetKind::TaskDefs, AssetKind::InitStates]);
    let file_name = last.demonstration_path().file_name().expect("file name").to_owned();
    let alternate = touch(
        &fixture
            .paths
            .resolve(AssetCategory::Datasets)
            .join("libero_spatial")
            .join(file_name),
    );

    let report = AssetVerifier::new(&fixture.paths, &catalog)
        .verify("libero_10", &AssetKind::ALL)
        .expect("verify");

    let entry = report
        .entries
        .iter()
        .find(|entry| entry.task_index == 9 && entry.kind == AssetKind::Datasets)
        .expect("task 9 dataset entry");
    assert_eq!(
        entry.status,
        AssetStatus::PresentInAlternateCategory {
            alternate: "libero_spatial".to_string(),
            path: alternate,
        }
    );
    assert!(report.is_complete());
    assert_eq!(report.summary()[2].alternate, 1);
}

#[test]
fn fallback_only_applies_to_datasets_and_can_be_disabled() {
    let fixture = Fixture::new();
    let catalog = TaskCatalog::builtin();
    let task = catalog.get_task("libero_10", 0).expect("task").clone();
    let bddl_name = task.relative_path(AssetKind::TaskDefs);
    touch(
        &fixture
            .paths
            .resolve(AssetCategory::BddlFiles)
            .join("libero_spatial")
            .join(bddl_name.file_name().expect("bddl file name")),
    );
    let file_name = task.demonstration_path().file_name().expect("file name").to_owned();
    touch(
        &fixture
            .paths
            .resolve(AssetCategory::Datasets)
            .join("libero_spatial")
            .join(file_name),
    );

    let report = AssetVerifier::new(&fixture.paths, &catalog)
        .with_fallback_suites(Vec::new())
        .verify("libero_10", &[AssetKind::TaskDefs, AssetKind::Datasets])
        .expect("verify");

    assert!(report.entries[0].is_missing());
    assert!(report.entries[1].is_missing());
}

#[test]
fn fallback_chain_is_searched_in_order() {
    let fixture = Fixture::new();
    let catalog = TaskCatalog::builtin();
    let task = catalog.get_task("libero_10", 3).expect("task").clone();
    let file_name = task.demonstration_path().file_name().expect("file name").to_owned();
    let datasets = fixture.paths.resolve(AssetCategory::Datasets).to_path_buf();
    touch(&datasets.join("libero_object").join(&file_name));
    touch(&datasets.join("libero_goal").join(&file_name));

    let report = AssetVerifier::new(&fixture.paths, &catalog)
        .with_fallback_suites(vec![
            "libero_spatial".to_string(),
            "libero_goal".to_string(),
            "libero_object".to_string(),
        ])
        .verify("libero_10", &[AssetKind::Datasets])
        .expect("verify");

    assert_eq!(
        report.entries[3].status,
        AssetStatus::PresentInAlternateCategory {
            alternate: "libero_goal".to_string(),
            path: datasets.join("libero_goal").join(file_name),
        }
    );
}

#[test]
fn malformed_task_is_reported_missing_and_later_tasks_still_verified() {
    let fixture = Fixture::new();
    let mut broken = TaskDescriptor::from_name("custom", "broken_task");
    let healthy = TaskDescriptor::from_name("custom", "healthy_task");
    fixture.populate(&broken, &AssetKind::ALL);
    fixture.populate(&healthy, &AssetKind::ALL);
    broken.bddl_file.clear();

    let mut catalog = TaskCatalog::default();
    catalog.insert(Benchmark {
        id: "custom".to_string(),
        tasks: vec![broken, healthy],
    });

    let report = AssetVerifier::new(&fixture.paths, &catalog)
        .verify("custom", &AssetKind::ALL)
        .expect("verify does not fail on malformed tasks");

    assert_eq!(report.entries.len(), 6);
    for entry in &report.entries[..3] {
        assert!(entry.is_missing(), "{entry:?}");
        assert_eq!(entry.malformed.map(|issue| issue.field), Some("bddl_file"));
    }
    for entry in &report.entries[3..] {
        assert_eq!(entry.status, AssetStatus::Present);
        assert_eq!(entry.malformed, None);
    }
    assert_eq!(report.summary()[0].malformed, 1);
}

#[test]
fn verification_has_no_filesystem_side_effects() {
    let fixture = Fixture::new();
    let catalog = TaskCatalog::builtin();
    let task = catalog.get_task("libero_spatial", 2).expect("task").clone();
    fixture.populate(&task, &[AssetKind::InitStates]);
    let before = list_files(fixture.root());

    let first = AssetVerifier::new(&fixture.paths, &catalog)
        .verify("libero_spatial", &AssetKind::ALL)
        .expect("verify");
    let second = AssetVerifier::new(&fixture.paths, &catalog)
        .verify("libero_spatial", &AssetKind::ALL)
        .expect("verify again");

    assert_eq!(list_files(fixture.root()), before);
    assert_eq!(first, second);
}

#[test]
fn unknown_benchmark_is_an_error() {
    let fixture = Fixture::new();
    let catalog = TaskCatalog::builtin();
    let err = AssetVerifier::new(&fixture.paths, &catalog)
        .verify("libero_1000", &AssetKind::ALL)
        .expect_err("unknown benchmark");
    assert!(matches!(err, CatalogError::UnknownBenchmark(_)));
}

#[test]
fn report_serializes_status_inline() {
    let fixture = Fixture::new();
    let catalog = TaskCatalog::builtin();
    let report = AssetVerifier::new(&fixture.paths, &catalog)
        .verify("libero_object", &[AssetKind::TaskDefs])
        .expect("verify");
    let value = serde_json::to_value(&report).expect("serialize report");
    assert_eq!(value["entries"][0]["status"], "missing");
    assert_eq!(value["entries"][0]["kind"], "task_defs");
}

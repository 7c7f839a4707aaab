use std::sync::Arc;

use crate::support::{
    helpers::{artifact_names, init_tracing, payloads, RecordingConverter},
    mock_fetch::MockFetchClient,
};
use anyhow::Result;
use batchfetch::{
    BatchOrchestrator, FetchStrategy, OrchestratorConfig, PartitionKey, PartitionPayloads,
};
use tempfile::TempDir;

fn three_years() -> PartitionPayloads {
    PartitionPayloads::from([
        (PartitionKey::from(2021), payloads(&["4-d", "5-e"])),
        (PartitionKey::from(2019), payloads(&["1-a"])),
        (PartitionKey::from(2020), payloads(&["2-b", "3-c"])),
    ])
}

#[tokio::test]
async fn run_processes_only_the_first_partition() -> Result<()> {
    init_tracing();
    let tmp = TempDir::new()?;
    let client = MockFetchClient::new();
    let converter = RecordingConverter::default();
    let config = OrchestratorConfig::builder()
        .output_root(tmp.path())
        .build()?;
    let orchestrator =
        BatchOrchestrator::new(config, Arc::new(client.clone()), Arc::new(converter.clone()))?;

    let report = orchestrator.run(&three_years()).await?;

    assert_eq!(report.partition, PartitionKey::from(2019));
    assert_eq!(client.calls(), vec!["1-a"]);
    assert!(!tmp.path().join("2020").exists());
    assert_eq!(converter.jobs().len(), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn run_all_converts_each_partition_into_its_own_output() -> Result<()> {
    init_tracing();
    let tmp = TempDir::new()?;
    let nc_root = tmp.path().join("nc");
    let csv_root = tmp.path().join("csv");
    let client = MockFetchClient::new().fail_on("5-e");
    let converter = RecordingConverter::default();
    let config = OrchestratorConfig::builder()
        .output_root(&nc_root)
        .conversion_root(&csv_root)
        .strategy(FetchStrategy::Concurrent)
        .build()?;
    let orchestrator =
        BatchOrchestrator::new(config, Arc::new(client.clone()), Arc::new(converter.clone()))?;

    let reports = orchestrator.run_all(&three_years()).await?;

    let order: Vec<_> = reports.iter().map(|r| r.partition.to_string()).collect();
    assert_eq!(order, vec!["2019", "2020", "2021"]);
    assert_eq!(artifact_names(&nc_root.join("2020"))?, vec!["2-b.nc", "3-c.nc"]);
    assert_eq!(artifact_names(&nc_root.join("2021"))?, vec!["4-d.nc"]);
    assert_eq!(reports[2].failed_out_names(), vec!["5-e"]);

    let jobs = converter.jobs();
    assert_eq!(jobs.len(), 3);
    for (job, _) in &jobs {
        let expected = csv_root.join(job.partition().as_str());
        assert_eq!(job.output_dir(), Some(expected.as_path()));
        assert!(expected.join(format!("{}.csv", job.partition())).is_file());
    }

    let snapshot = orchestrator.telemetry().snapshot();
    assert_eq!(snapshot.partitions_completed, 3);
    assert_eq!(snapshot.requests_succeeded, 4);
    assert_eq!(snapshot.requests_failed, 1);
    Ok(())
}

#[tokio::test]
async fn rerunning_a_partition_starts_from_a_clean_workspace() -> Result<()> {
    init_tracing();
    let tmp = TempDir::new()?;
    let converter = RecordingConverter::default();
    let config = OrchestratorConfig::builder()
        .output_root(tmp.path())
        .build()?;

    let first = BatchOrchestrator::new(
        config.clone(),
        Arc::new(MockFetchClient::new()),
        Arc::new(converter.clone()),
    )?;
    first
        .run(&PartitionPayloads::from([(
            PartitionKey::from(2020),
            payloads(&["1-a", "2-b"]),
        )]))
        .await?;

    let second = BatchOrchestrator::new(
        config,
        Arc::new(MockFetchClient::new()),
        Arc::new(converter.clone()),
    )?;
    let report = second
        .run(&PartitionPayloads::from([(
            PartitionKey::from(2020),
            payloads(&["3-c"]),
        )]))
        .await?;

    assert_eq!(artifact_names(report.workspace())?, vec!["3-c.nc"]);
    let jobs = converter.jobs();
    assert_eq!(jobs[0].1, vec!["1-a.nc", "2-b.nc"]);
    assert_eq!(jobs[1].1, vec!["3-c.nc"]);
    Ok(())
}

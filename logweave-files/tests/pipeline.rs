use logweave_core::{FilterKind, LogLevel, LogModel, LogView, Timestamp};
use logweave_files::{LoadDesc, LoadError, LogFile, open_all, parse_all};
use std::{fs, path::PathBuf};

const TEXT_LOG: &str = "\
1000 | S 100.000 2020-05-01 07:05:53 UTC | INFO | api started
1500 | S 100.000 2020-05-01 07:05:53 UTC | ERROR | request failed:
  caused by: timeout
2500 | S 100.000 2020-05-01 07:05:53 UTC | WARN | retrying
";

fn counter_log() -> String {
    [
        "\niPao2ijSahbe0F100 time anchor: 0.0 100.0",
        "\niPao2ijSahbe0F150 node heartbeat",
        "\niPao2ijSahbe0F200 time anchor: 0.0 100.1000",
        "\niPao2ijSahbe0F300 node heartbeat late",
        "\n",
    ]
    .concat()
}

fn write_logs(dir: &tempfile::TempDir) -> Vec<PathBuf> {
    let text = dir.path().join("api-async-stdout.log");
    let counter = dir.path().join("node-memorylog.bin");
    fs::write(&text, TEXT_LOG).unwrap();
    fs::write(&counter, counter_log()).unwrap();
    vec![text, counter]
}

#[test]
fn test_files_merge_into_one_timeline() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_logs(&dir);
    let desc = LoadDesc::new();

    let files = open_all(&paths, &desc).unwrap();
    let sources = parse_all(&files, &desc).unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].len(), 3);
    assert_eq!(sources[1].len(), 2);

    let model = LogModel::new(sources);
    assert_eq!(model.unfiltered_count(), 5);
    let messages: Vec<String> = model
        .records()
        .iter()
        .map(|r| r.message_text().into_owned())
        .collect();
    assert_eq!(
        messages,
        vec![
            "api started",
            // same instant as the heartbeat, the first file wins the tie
            "request failed:\n  caused by: timeout",
            "node heartbeat",
            "retrying",
            "node heartbeat late",
        ]
    );
    assert_eq!(
        model.source_labels(),
        paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>()
    );
}

#[test]
fn test_filters_and_navigation_over_loaded_files() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_logs(&dir);
    let mut desc = LoadDesc::new();
    desc.parallel = false;

    let files = open_all(&paths, &desc).unwrap();
    let mut model = LogModel::new(parse_all(&files, &desc).unwrap());

    // "api started" at 100s exactly
    model.select_record_by_timestamp(Timestamp::from_nanos(100_000_000_000));
    assert_eq!(model.selected().unwrap().message, b"api started");

    model.add_pattern_filter("heartbeat", false);
    assert_eq!(model.filters()[0].kind(), FilterKind::ExcludePattern);
    assert_eq!(model.filtered_count(), 3);
    assert_eq!(model.selected_record(), 0);
    assert_eq!(model.selected().unwrap().message, b"api started");

    model.add_level_filter([LogLevel::Error, LogLevel::Warning].into_iter().collect());
    assert_eq!(model.filtered_count(), 2);
    // the selected record was filtered out and nothing earlier remains
    assert_eq!(model.selected_record(), 0);

    model.remove_all_filters();
    model.search_for_message("late");
    assert_eq!(model.selected().unwrap().message, b"node heartbeat late");
    assert_eq!(model.search_matches(model.selected().unwrap().message), vec![15..19]);
}

#[test]
fn test_first_failing_file_aborts_loading() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = write_logs(&dir);
    let broken = dir.path().join("broken-memorylog.bin");
    fs::write(&broken, "\niPao2ijSahbe0F1 only one time anchor: 0.0 1.0\n").unwrap();
    paths.push(broken.clone());

    let desc = LoadDesc::new();
    let files: Vec<LogFile> = open_all(&paths, &desc).unwrap();
    match parse_all(&files, &desc) {
        Err(LoadError::File { path, .. }) => assert_eq!(path, broken),
        other => panic!("expected a load error, got {:?}", other.map(|s| s.len())),
    }
}

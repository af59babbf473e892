use std::{fs, path::Path};

use symptom_pipeline::{
    data::{
        normalize::SynonymTable,
        store::{self, ArtifactPaths},
    },
    error::PipelineError,
    features::{build_request_vector, FeatureIndex},
    pipeline::{self, FileErrorPolicy, PipelineOptions},
};
use tempfile::TempDir;

const SYMPTOM_LIST: &str = "disease,symptoms\nFlu,\"fever, cough\"\nFlu,\"cough,fever\"\nCommon Cold Disease,sneezing;Pyrexia\n";
const MATRIX: &str = "disease,fever,cough,rash,itch,ache\nMeasles,1,0,1,0,0\n";
const NOTES: &str =
    "diagnosis,description\nMigraine,\"Severe headache; nausea. Light sensitivity.\"\n";
const SYNONYMS: &str = r#"{"headache": ["severe headache"], "fever": ["pyrexia", "high temperature"]}"#;

struct Workspace {
    _root: TempDir,
    options: PipelineOptions,
}

fn workspace(policy: FileErrorPolicy) -> Workspace {
    let root = tempfile::tempdir().unwrap();
    let raw = root.path().join("raw");
    fs::create_dir_all(&raw).unwrap();
    fs::write(raw.join("a.csv"), SYMPTOM_LIST).unwrap();
    fs::write(raw.join("b.csv"), MATRIX).unwrap();
    fs::write(raw.join("c.csv"), NOTES).unwrap();
    fs::write(raw.join("readme.txt"), "not a dataset").unwrap();
    let synonyms = root.path().join("synonyms.json");
    fs::write(&synonyms, SYNONYMS).unwrap();
    let options = PipelineOptions {
        input_dir: raw,
        output_dir: root.path().join("processed"),
        synonyms_path: synonyms,
        on_file_error: policy,
    };
    Workspace {
        _root: root,
        options,
    }
}

fn snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let paths = ArtifactPaths::in_dir(dir);
    [paths.master, paths.features, paths.stats]
        .iter()
        .map(|p| (p.display().to_string(), fs::read(p).unwrap()))
        .collect()
}

#[test]
fn run_publishes_master_dataset_and_index() {
    let ws = workspace(FileErrorPolicy::Skip);
    let report = pipeline::run(&ws.options).unwrap();
    assert_eq!(report.ingested.len(), 3);
    assert!(report.failed.is_empty());
    assert_eq!(report.records, 4);

    let master = store::load_master(&ArtifactPaths::in_dir(&ws.options.output_dir)).unwrap();
    let diseases: Vec<&str> = master.records.iter().map(|r| r.disease.as_str()).collect();
    assert_eq!(diseases, vec!["flu", "common cold", "measles", "migraine"]);
    assert_eq!(
        master.index.symptoms().collect::<Vec<_>>(),
        vec![
            "cough",
            "fever",
            "headache",
            "light sensitivity",
            "nausea",
            "rash",
            "sneezing"
        ]
    );
    assert_eq!(master.index.fingerprint(), report.fingerprint);

    let synonyms = SynonymTable::load(&ws.options.synonyms_path).unwrap();
    let vector = build_request_vector(
        ["High Temperature", "rash", "tinnitus"],
        &master.index,
        &synonyms,
    );
    assert_eq!(vector.to_vec(), vec![0, 1, 0, 0, 0, 1, 0]);
}

#[test]
fn repeated_runs_are_byte_identical() {
    let ws = workspace(FileErrorPolicy::Skip);
    pipeline::run(&ws.options).unwrap();
    let first = snapshot(&ws.options.output_dir);
    pipeline::run(&ws.options).unwrap();
    assert_eq!(first, snapshot(&ws.options.output_dir));
}

#[test]
fn bad_files_are_skipped_or_abort_per_policy() {
    let ws = workspace(FileErrorPolicy::Skip);
    fs::write(ws.options.input_dir.join("bb.csv"), "disease,symptoms\nflu,a,b,c\n").unwrap();
    let report = pipeline::run(&ws.options).unwrap();
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].path.ends_with("bb.csv"));
    let published = snapshot(&ws.options.output_dir);

    let mut aborting = ws.options.clone();
    aborting.on_file_error = FileErrorPolicy::Abort;
    let err = pipeline::run(&aborting).unwrap_err();
    assert!(matches!(err, PipelineError::UnreadableFile { .. }));
    assert_eq!(published, snapshot(&ws.options.output_dir));
}

#[test]
fn empty_vocabulary_keeps_previous_snapshot() {
    let ws = workspace(FileErrorPolicy::Skip);
    pipeline::run(&ws.options).unwrap();
    let published = snapshot(&ws.options.output_dir);
    let features = ArtifactPaths::in_dir(&ws.options.output_dir).features;
    let index_before = FeatureIndex::load(&features).unwrap();

    for name in ["a.csv", "b.csv", "c.csv"] {
        fs::write(ws.options.input_dir.join(name), "disease,symptoms\nFlu,\n").unwrap();
    }
    let err = pipeline::run(&ws.options).unwrap_err();
    assert!(matches!(err, PipelineError::EmptyVocabulary { .. }));
    assert_eq!(published, snapshot(&ws.options.output_dir));
    let index_after = FeatureIndex::load(&features).unwrap();
    assert_eq!(index_before, index_after);
}

#[test]
fn missing_inputs_are_reported() {
    let ws = workspace(FileErrorPolicy::Skip);
    let mut options = ws.options.clone();
    options.synonyms_path = options.input_dir.join("missing.json");
    assert!(matches!(
        pipeline::run(&options),
        Err(PipelineError::MissingInput { .. })
    ));

    let mut options = ws.options.clone();
    options.input_dir = options.input_dir.join("nope");
    assert!(matches!(
        pipeline::run(&options),
        Err(PipelineError::MissingInput { .. })
    ));
}

use std::fs;

use assert_cmd::Command;

#[test]
fn cli_help_runs() {
    let mut cmd = Command::cargo_bin("symptom-pipeline").expect("binary exists");
    cmd.arg("--help").assert().success();
}

#[test]
fn preprocess_then_vectorize() {
    let root = tempfile::tempdir().unwrap();
    let raw = root.path().join("raw");
    fs::create_dir_all(&raw).unwrap();
    fs::write(raw.join("a.csv"), "disease,symptoms\nFlu,\"fever, cough\"\nCold,sneezing\n").unwrap();
    fs::write(root.path().join("synonyms.json"), r#"{"fever": ["pyrexia"]}"#).unwrap();

    let run = |args: &[&str]| {
        Command::cargo_bin("symptom-pipeline")
            .expect("binary exists")
            .current_dir(root.path())
            .env("RAW_DIR", &raw)
            .env("PROCESSED_DIR", root.path().join("processed"))
            .env("MODEL_DIR", root.path().join("model"))
            .env("SYNONYMS_PATH", root.path().join("synonyms.json"))
            .args(args)
            .output()
            .expect("command runs")
    };

    let output = run(&["preprocess"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(root.path().join("processed/features.json").exists());

    let output = run(&["vectorize", "--symptoms", "Pyrexia,sneezing,unknown"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let vector: Vec<u8> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(vector, vec![0, 1, 1]);

    let output = run(&["vectorize", "--verbatim", "--symptoms", "FEVER!!,Pyrexia,sneezing"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let vector: Vec<u8> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(vector, vec![0, 0, 1]);
}

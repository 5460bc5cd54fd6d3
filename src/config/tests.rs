use super::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn config_file_persistence() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let config_path = temp_dir.path().join(DEFAULT_CONFIG_FILE);

    let mut original_config = Config::default();
    original_config.documents.directory = "budget-pdfs".into();
    original_config.chunking.chunk_size = 500;
    original_config.chunking.chunk_overlap = 20;
    original_config.retrieval.top_k = 4;
    original_config.openai.temperature = 0.2;

    original_config
        .save(&config_path)
        .expect("config should save successfully");

    let loaded_config = Config::load(&config_path).expect("config should load successfully");

    assert_eq!(loaded_config.source_path.as_deref(), Some(config_path.as_path()));
    assert_eq!(loaded_config.documents, original_config.documents);
    assert_eq!(loaded_config.chunking, original_config.chunking);
    assert_eq!(loaded_config.retrieval, original_config.retrieval);
    assert_eq!(loaded_config.openai, original_config.openai);
}

#[test]
fn invalid_toml_handling() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let config_path = temp_dir.path().join(DEFAULT_CONFIG_FILE);

    fs::write(&config_path, "[chunking\nchunk_size = ").expect("should write file");

    assert!(Config::load(&config_path).is_err());
}

#[test]
fn invalid_values_rejected_on_load() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let config_path = temp_dir.path().join(DEFAULT_CONFIG_FILE);

    fs::write(
        &config_path,
        "[chunking]\nchunk_size = 100\nchunk_overlap = 100\n",
    )
    .expect("should write file");

    let err = Config::load(&config_path).expect_err("overlap equal to size must be rejected");
    assert!(format!("{:#}", err).contains("overlap"));
}

#[test]
fn partial_file_uses_defaults() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let config_path = temp_dir.path().join(DEFAULT_CONFIG_FILE);

    fs::write(&config_path, "[retrieval]\ntop_k = 5\n").expect("should write file");

    let config = Config::load(&config_path).expect("config should load");
    assert_eq!(config.retrieval.top_k, 5);
    assert_eq!(config.chunking.chunk_size, 800);
    assert_eq!(config.chunking.chunk_overlap, 50);
    assert_eq!(config.documents.directory, std::path::PathBuf::from("documents/"));
}

#[test]
fn missing_file_yields_defaults() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let config = Config::load(temp_dir.path().join("absent.toml")).expect("defaults");

    assert_eq!(config, Config::default());
    assert!(config.source_path.is_none());
}

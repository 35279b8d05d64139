use super::*;
use tempfile::TempDir;

#[test]
fn default_config() {
    let config = Config::default();
    assert_eq!(config.ollama.protocol, "http");
    assert_eq!(config.ollama.host, "localhost");
    assert_eq!(config.ollama.port, 11434);
    assert_eq!(config.ollama.embedding_model, "nomic-embed-text:latest");
    assert_eq!(config.ollama.generation_model, "llama3.2:latest");
    assert_eq!(config.ollama.batch_size, 16);
    assert_eq!(config.chunking.window_size, 500);
    assert_eq!(config.chunking.overlap, 50);
}

#[test]
fn config_validation() {
    let config = Config::default();
    assert!(config.validate().is_ok());

    let mut invalid_config = config.clone();
    invalid_config.ollama.protocol = "ftp".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.port = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.embedding_model = String::new();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.generation_model = String::new();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.batch_size = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config;
    invalid_config.ollama.batch_size = 1001;
    assert!(invalid_config.validate().is_err());
}

#[test]
fn chunking_validation() {
    let mut config = Config::default();
    config.chunking.window_size = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidWindowSize(0))
    ));

    let mut config = Config::default();
    config.chunking.window_size = 100;
    config.chunking.overlap = 100;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidOverlap(100, 100))
    ));

    let mut config = Config::default();
    config.chunking.window_size = 100;
    config.chunking.overlap = 99;
    assert!(config.validate().is_ok());
}

#[test]
fn prompt_template_validation() {
    let mut config = Config::default();
    config.prompt.instruction = "no placeholders here".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidPromptTemplate(_))
    ));
}

#[test]
fn ollama_url_generation() {
    let config = Config::default();
    let url = config
        .ollama_url()
        .expect("should generate ollama_url successfully");
    assert_eq!(url.as_str(), "http://localhost:11434/");
}

#[test]
fn toml_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string(&config).expect("should serialize toml correctly");
    let mut parsed_config: Config =
        toml::from_str(&toml_str).expect("should parse toml correctly");
    parsed_config.base_dir = config.base_dir.clone();
    assert_eq!(config, parsed_config);
}

#[test]
fn load_missing_file_yields_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config::load_from(temp_dir.path()).expect("should load defaults");

    assert_eq!(config.ollama, OllamaConfig::default());
    assert_eq!(config.base_dir, temp_dir.path());
}

#[test]
fn save_and_reload_roundtrip() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let mut config = Config {
        base_dir: temp_dir.path().to_path_buf(),
        ..Config::default()
    };
    config.ollama.port = 12345;
    config.chunking.window_size = 300;
    config.chunking.overlap = 30;
    config.save().expect("should save config");

    let reloaded = Config::load_from(temp_dir.path()).expect("should reload config");
    assert_eq!(reloaded, config);
}

#[test]
fn invalid_config_is_not_saved() {
    let temp_dir = TempDir::new().expect("should create temp dir");

    let mut config = Config {
        base_dir: temp_dir.path().to_path_buf(),
        ..Config::default()
    };
    config.ollama.batch_size = 0;

    assert!(config.save().is_err());
    assert!(!config.config_file_path().exists());
}

#[test]
fn paths_derive_from_base_dir() {
    let config = Config {
        base_dir: PathBuf::from("/tmp/ragline-test"),
        ..Config::default()
    };

    assert_eq!(
        config.config_file_path(),
        PathBuf::from("/tmp/ragline-test/config.toml")
    );
    assert_eq!(
        config.vector_database_path(),
        PathBuf::from("/tmp/ragline-test/vectors")
    );
}

use std::path::PathBuf;

use super::*;
use crate::app_dirs::{APP_DIR_NAME, ConfigBaseGuard};
use tempfile::tempdir;

#[test]
fn saves_and_reloads_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cfg.toml");
    let mut config = PipelineConfig::default();
    config.storage.data_dir = Some(PathBuf::from("/srv/englid"));
    config.generator.chunk_length = 120;
    config.generator.seed = Some(5);
    config.features.fold_case_on_predict = true;
    config.training.epochs = 12;
    config.evaluation.holdout_fraction = 0.25;

    save_to_path(&config, &path).unwrap();
    let loaded = load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cfg.toml");
    std::fs::write(
        &path,
        "[training]\nepochs = 3\n\n[evaluation]\nholdout_fraction = 5.0\n",
    )
    .unwrap();
    let loaded = load_from(&path).unwrap();
    assert_eq!(loaded.training.epochs, 3);
    assert_eq!(loaded.training.batch_size, 64);
    assert_eq!(loaded.storage, StorageSettings::default());
    assert_eq!(loaded.features, crate::features::FeatureConfig::default());
    assert_eq!(loaded.evaluation.holdout_fraction, 0.9);
}

#[test]
fn invalid_toml_is_reported_with_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cfg.toml");
    std::fs::write(&path, "[training\nepochs = ").unwrap();
    let err = load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseToml { path: p, .. } if p == path));
}

#[test]
fn missing_default_file_yields_defaults_but_explicit_path_must_exist() {
    let dir = tempdir().unwrap();
    let _guard = ConfigBaseGuard::set(dir.path().to_path_buf());
    assert_eq!(load_or_default(None).unwrap(), PipelineConfig::default());
    assert_eq!(
        config_path().unwrap(),
        dir.path().join(APP_DIR_NAME).join(CONFIG_FILE_NAME)
    );
    let err = load_or_default(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn default_save_location_round_trips() {
    let dir = tempdir().unwrap();
    let _guard = ConfigBaseGuard::set(dir.path().to_path_buf());
    let mut config = PipelineConfig::default();
    config.training.seed = 99;
    save(&config).unwrap();
    assert_eq!(load_or_default(None).unwrap().training.seed, 99);
}

#[test]
fn relative_files_resolve_under_data_dir() {
    let dir = tempdir().unwrap();
    let mut config = PipelineConfig::default();
    let data_dir = dir.path().join("data");
    config.storage.data_dir = Some(data_dir.clone());
    config.storage.model_file = dir.path().join("elsewhere").join("m.bin");

    let paths = config.resolve_paths().unwrap();
    assert!(data_dir.is_dir());
    assert_eq!(paths.database, data_dir.join("english-text.db"));
    assert_eq!(paths.dataset, data_dir.join("dataset.bin"));
    assert_eq!(paths.model, dir.path().join("elsewhere").join("m.bin"));
}

#[test]
fn default_data_dir_lives_under_app_root() {
    let dir = tempdir().unwrap();
    let _guard = ConfigBaseGuard::set(dir.path().to_path_buf());
    let paths = PipelineConfig::default().resolve_paths().unwrap();
    assert_eq!(paths.data_dir, dir.path().join(APP_DIR_NAME).join("data"));
}

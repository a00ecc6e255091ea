use globe_lib::config::Config;
use std::{collections::HashSet, fs, path::Path};

const CONFIG_FILES: &[&str] = &["example.toml", "iss_only.toml", "leo_sample.toml"];

#[test]
fn example_config_file_list_matches_expected() {
    let cfg_files: HashSet<String> = fs::read_dir("../configs")
        .unwrap()
        .map(|d| d.unwrap().file_name().into_string().unwrap())
        .collect();
    let expected: HashSet<String> = CONFIG_FILES.iter().map(|f| f.to_string()).collect();
    assert_eq!(cfg_files, expected, "Example configs directory is missing an expected config file or contains a new config file that should be tested");
}

#[test]
fn example_config_files_parse() {
    let dir = Path::new("../configs");
    for cfg_file in CONFIG_FILES {
        let p = dir.join(cfg_file);
        if let Err(e) = Config::load(&p) {
            panic!("{}: {e}", p.display());
        }
    }
}

#[test]
fn example_config_is_the_defaults() {
    let example = Config::load("../configs/example.toml").unwrap();
    let defaults = Config::default();
    assert_eq!(example.frame_step().unwrap(), defaults.frame_step().unwrap());
    assert_eq!(example.frame_rate().unwrap(), defaults.frame_rate().unwrap());
    assert_eq!(example.marker_style().unwrap(), defaults.marker_style().unwrap());
    assert_eq!(example.camera_altitude(), defaults.camera_altitude());
    assert_eq!(
        example.ingest_options().unwrap().max_objects,
        defaults.ingest_options().unwrap().max_objects
    );
    assert_eq!(example.start().unwrap(), None);
}

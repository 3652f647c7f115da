use std::path::Path;

use optcat_core::{
    CliOption, OptionCatalog, OptionGroup, ParseError, ParserConfig, UnknownOptionPolicy,
};
use optcat_loader::{CatalogDocument, LoaderError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

const TAR_YAML: &str = r#"
version: "1.0"
parser:
  unknown: reject
options:
  - short: v
    long: verbose
  - short: f
    long: file
    args: 1
    required: true
groups:
  - required: true
    options:
      - short: c
        long: create
      - short: x
        long: extract
"#;

// ---------------------------------------------------------------------------
// Loading and parsing
// ---------------------------------------------------------------------------

#[test]
fn test_load_yaml_and_parse() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "tar.yaml", TAR_YAML);

    let doc = CatalogDocument::load(&path).unwrap();
    let catalog = doc.to_catalog().unwrap();
    let result = doc
        .parser()
        .parse(&catalog, &["-cvf", "out.tar", "src"])
        .unwrap();

    assert!(result.has_option("create"));
    assert!(result.has_option("verbose"));
    assert_eq!(result.option_value("f"), Some("out.tar"));
    assert_eq!(result.args(), ["src".to_string()]);
}

#[test]
fn test_loaded_catalog_enforces_requirements_and_groups() {
    let doc = CatalogDocument::from_yaml_str(TAR_YAML).unwrap();
    let catalog = doc.to_catalog().unwrap();
    let parser = doc.parser();

    let err = parser.parse::<&str>(&catalog, &[]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing required options: f, [-c, -x]"
    );

    let err = parser.parse(&catalog, &["-c", "-x", "-f", "a"]).unwrap_err();
    assert!(matches!(err, ParseError::GroupConflict { .. }));
}

#[test]
fn test_load_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "cat.json",
        r#"{
  "parser": { "unknown": "positional", "stop_at_non_option": true },
  "options": [ { "short": "n", "long": "number", "value_type": "integer", "args": 1 } ]
}"#,
    );

    let doc = CatalogDocument::load(&path).unwrap();
    assert_eq!(doc.parser_config().unknown, UnknownOptionPolicy::Positional);
    let catalog = doc.to_catalog().unwrap();
    let result = doc
        .parser()
        .parse(&catalog, &["-n", "3", "file", "-n", "4"])
        .unwrap();
    assert_eq!(result.option_values("n"), Some(vec!["3"]));
    assert_eq!(
        result.args(),
        ["file".to_string(), "-n".to_string(), "4".to_string()]
    );
}

#[test]
fn test_malformed_documents() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = write(dir.path(), "bad.yaml", "parser: [not, a, map]\n");
    assert!(matches!(CatalogDocument::load(&yaml), Err(LoaderError::Yaml(_))));

    let json = write(dir.path(), "bad.json", "{ \"parser\": ");
    assert!(matches!(CatalogDocument::load(&json), Err(LoaderError::Json(_))));

    let missing = dir.path().join("missing.yaml");
    assert!(matches!(CatalogDocument::load(&missing), Err(LoaderError::Io(_))));
}

#[test]
fn test_invalid_long_name_reports_catalog_error() {
    let doc = CatalogDocument::from_yaml_str(
        "parser:\n  unknown: reject\noptions:\n  - long: \"has space\"\n",
    )
    .unwrap();
    let err = doc.to_catalog().unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid option definition: invalid long option name: 'has space'"
    );
}

// ---------------------------------------------------------------------------
// Describing catalogs built in code
// ---------------------------------------------------------------------------

#[test]
fn test_save_catalog_built_in_code() {
    let mut catalog = OptionCatalog::new();
    catalog.add_long_flag('o', "output", true, "Output file").unwrap();
    catalog.add_option_group(
        OptionGroup::new()
            .with_option(CliOption::flag(None, Some("fast")).unwrap())
            .with_option(CliOption::flag(None, Some("safe")).unwrap()),
    );

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("built.yml");
    CatalogDocument::from_catalog(&catalog, ParserConfig::strict())
        .save(&path)
        .unwrap();

    let loaded = CatalogDocument::load(&path).unwrap().to_catalog().unwrap();
    assert_eq!(loaded.to_string(), catalog.to_string());
    assert_eq!(loaded.option_groups().count(), 1);
}

use std::sync::Arc;
use std::thread;

use optcat_core::*;

fn long_flag(long: &str) -> CliOption {
    CliOption::flag(None, Some(long)).unwrap()
}

fn required(short: char) -> CliOption {
    CliOption::builder().short(short).required(true).build().unwrap()
}

fn strict() -> Parser {
    Parser::new(ParserConfig::strict())
}

#[test]
fn test_registered_options_are_found_and_others_are_not() {
    let mut catalog = OptionCatalog::new();
    catalog.add_long_flag('f', "file", true, "input").unwrap();
    catalog.add_option(long_flag("dry-run"));

    for name in ["f", "-f", "file", "--file", "dry-run", "--dry-run"] {
        assert!(catalog.has_option(name), "{name} should be registered");
    }
    assert!(!catalog.has_option("g"));
    assert!(!catalog.has_option("files"));
}

#[test]
fn test_last_registration_wins() {
    let mut catalog = OptionCatalog::new();
    catalog.add_long_flag('a', "alpha", false, "first").unwrap();
    catalog.add_long_flag('a', "alpha", false, "second").unwrap();
    assert_eq!(catalog.option("a").unwrap().description(), Some("second"));
    assert_eq!(catalog.option("alpha").unwrap().description(), Some("second"));
}

#[test]
fn test_grouped_option_is_not_required() {
    let mut catalog = OptionCatalog::new();
    catalog.add_option(required('o'));
    assert_eq!(catalog.required_options(), vec!["o"]);

    catalog.add_option_group(OptionGroup::new().with_option(required('o')));
    assert!(catalog.required_options().is_empty());
    strict().parse::<&str>(&catalog, &[]).unwrap();
}

#[test]
fn test_matching_options_counts() {
    let mut catalog = OptionCatalog::new();
    catalog.add_option(long_flag("version"));
    catalog.add_option(long_flag("verbose"));
    assert_eq!(catalog.matching_options("ver").len(), 2);
    assert_eq!(catalog.matching_options("version").len(), 1);
    assert_eq!(catalog.matching_options("foo").len(), 0);
}

#[test]
fn test_empty_vector_reports_single_missing_option() {
    let mut catalog = OptionCatalog::new();
    catalog.add_option(required('f'));
    let err = strict().parse::<&str>(&catalog, &[]).unwrap_err();
    assert_eq!(err.to_string(), "Missing required option: f");
    assert_eq!(err.missing_options(), Some(&["f".to_string()][..]));
}

#[test]
fn test_empty_vector_reports_missing_options_in_order() {
    let mut catalog = OptionCatalog::new();
    catalog.add_option(required('f'));
    catalog.add_option(required('x'));
    let err = strict().parse::<&str>(&catalog, &[]).unwrap_err();
    assert_eq!(err.to_string(), "Missing required options: f, x");
}

#[test]
fn test_merging_disjoint_catalogs_is_a_union() {
    let mut left = OptionCatalog::new();
    left.add_flag('a', false, "").unwrap();
    left.add_option(long_flag("alpha"));
    let mut right = OptionCatalog::new();
    right.add_flag('b', false, "").unwrap();
    right.add_option_group(
        OptionGroup::new()
            .with_option(long_flag("json"))
            .with_option(long_flag("yaml"))
            .with_required(true),
    );

    left.add_options(&right).unwrap();
    assert_eq!(left.len(), 5);
    assert!(left.has_option("json"));
    assert_eq!(left.option_groups().count(), 1);
    assert_eq!(left.requirements().len(), 1);
}

#[test]
fn test_merging_catalog_with_itself_fails_without_changes() {
    let mut catalog = OptionCatalog::new();
    catalog.add_flag('a', false, "").unwrap();
    catalog.add_flag('b', false, "").unwrap();
    let before = catalog.to_string();

    let copy = catalog.clone();
    let err = catalog.add_options(&copy).unwrap_err();
    assert_eq!(err, CatalogError::ConflictingRegistration("a".to_string()));
    assert_eq!(err.to_string(), "Duplicate key: a");
    assert_eq!(catalog.to_string(), before);
}

#[test]
fn test_deprecated_strings() {
    let plain = CliOption::flag(Some('c'), None).unwrap();
    assert!(!plain.to_deprecated_string().starts_with("Option "));

    let bare = CliOption::builder().short('c').deprecated().build().unwrap();
    assert_eq!(bare.to_deprecated_string(), "Option 'c': Deprecated");

    let full = CliOption::builder()
        .short('c')
        .deprecated_with(
            DeprecatedAttributes::new()
                .for_removal()
                .with_since("2.0")
                .with_description("Use X."),
        )
        .build()
        .unwrap();
    assert_eq!(
        full.to_deprecated_string(),
        "Option 'c': Deprecated for removal since 2.0: Use X."
    );
}

#[test]
fn test_display_is_defined_for_every_shape() {
    let shapes = vec![
        CliOption::builder().short('a').build().unwrap(),
        CliOption::builder().long("only-long").build().unwrap(),
        CliOption::builder()
            .short('b')
            .long("both")
            .description("desc")
            .required(true)
            .has_args()
            .value_separator(',')
            .arg_name("ITEM")
            .value_type(ValueType::Choice(vec!["x".into(), "y".into()]))
            .deprecated_with(DeprecatedAttributes::new().for_removal())
            .build()
            .unwrap(),
        CliOption::builder().short('c').num_args(3).optional_arg(true).build().unwrap(),
    ];
    for option in shapes {
        assert!(option.to_string().starts_with("[ Option "));
        let _ = option.to_deprecated_string();
    }
}

#[test]
fn test_gnu_style_vector() {
    let mut catalog = OptionCatalog::new();
    catalog.add_flag('x', false, "extract").unwrap();
    catalog.add_flag('v', false, "verbose").unwrap();
    catalog.add_long_flag('f', "file", true, "archive").unwrap();
    catalog.add_option(
        CliOption::builder()
            .long("exclude")
            .has_args()
            .value_separator(',')
            .build()
            .unwrap(),
    );

    let result = strict()
        .parse(
            &catalog,
            &["-xvfarchive.tar", "--exclude=*.o,*.a", "--", "-v", "dir"],
        )
        .unwrap();
    assert!(result.has_option("x"));
    assert!(result.has_option("v"));
    assert_eq!(result.option_value("file"), Some("archive.tar"));
    assert_eq!(result.option_values("exclude"), Some(vec!["*.o", "*.a"]));
    assert_eq!(result.args(), ["-v".to_string(), "dir".to_string()]);
    assert_eq!(result.options().len(), 4);
}

#[test]
fn test_typed_values() {
    let mut catalog = OptionCatalog::new();
    catalog.add_option(
        CliOption::builder()
            .long("offset")
            .has_arg()
            .value_type(ValueType::Integer)
            .build()
            .unwrap(),
    );
    catalog.add_option(
        CliOption::builder()
            .long("mode")
            .has_arg()
            .value_type(ValueType::Choice(vec!["fast".into(), "safe".into()]))
            .build()
            .unwrap(),
    );

    let result = strict()
        .parse(&catalog, &["--offset", "-12", "--mode=safe"])
        .unwrap();
    assert_eq!(result.parsed_value("offset").unwrap(), Some(TypedValue::Integer(-12)));
    assert_eq!(
        result.parsed_value("mode").unwrap(),
        Some(TypedValue::Choice("safe".to_string()))
    );

    let result = strict().parse(&catalog, &["--mode", "slow"]).unwrap();
    assert!(matches!(
        result.parsed_value("mode"),
        Err(ParseError::InvalidValue { .. })
    ));
}

#[test]
fn test_one_catalog_parsed_from_many_threads() {
    let mut catalog = OptionCatalog::new();
    catalog.add_option_group(
        OptionGroup::new()
            .with_option(long_flag("left"))
            .with_option(long_flag("right"))
            .with_required(true),
    );
    let catalog = Arc::new(catalog);

    let handles: Vec<_> = ["--left", "--right", "--left", "--right"]
        .into_iter()
        .map(|arg| {
            let catalog = Arc::clone(&catalog);
            thread::spawn(move || strict().parse(&catalog, &[arg]).map(|r| r.options().len()))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 1);
    }
}

#[test]
fn test_parse_result_serializes() {
    let mut catalog = OptionCatalog::new();
    catalog.add_long_flag('o', "output", true, "").unwrap();
    let result = strict().parse(&catalog, &["-o", "out.txt", "in.txt"]).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["args"][0], "in.txt");
    assert_eq!(json["options"][0]["values"][0], "out.txt");
    assert_eq!(json["options"][0]["option"]["key"], "o");
}

#[test]
fn test_tokenize_whole_vector() {
    let mut catalog = OptionCatalog::new();
    catalog.add_flag('a', false, "").unwrap();
    let tokens = Tokenizer::new(&catalog).tokenize(&["-a", "x", "--", "-a"]);
    assert_eq!(tokens.len(), 4);
    assert_eq!(tokens[3], Token::Value("-a".to_string()));
}

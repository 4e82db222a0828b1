use std::path::PathBuf;

use license_compare::{
    CatalogEntry, LicenseCatalog, LicenseComparer, ScanConfig, license_uri_to_id,
    matching_exception_ids, matching_license_ids, matching_license_ids_within_text,
};

const MIT_TEXT: &str = include_str!("fixtures/mit.txt");
const MIT_TEMPLATE: &str = include_str!("fixtures/mit.template.txt");
const WIDGET_HEADER: &str = include_str!("fixtures/widget_header.rs");
const WIDGET_MAIN: &str = include_str!("fixtures/widget_main.rs");
const LINKING_EXCEPTION: &str = include_str!("fixtures/linking_exception.txt");

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("matcher=info")
        .with_test_writer()
        .try_init();
}

fn catalog() -> LicenseCatalog {
    LicenseCatalog::new()
        .with_license(
            CatalogEntry::new("0BSD", "Permission to use, copy, modify, and/or distribute this software for any purpose with or without fee is hereby granted."),
        )
        .with_license(CatalogEntry::new("MIT", MIT_TEXT).with_template(MIT_TEMPLATE))
        .with_license(
            CatalogEntry::new("MIT-Old", MIT_TEXT)
                .with_template(MIT_TEMPLATE)
                .with_deprecated(true),
        )
        .with_license(CatalogEntry::new("Broken-1.0", "unused").with_template("<<endOptional>>"))
        .with_exception(CatalogEntry::new("Sample-linking-exception", LINKING_EXCEPTION))
}

#[test]
fn verbatim_license_text_finds_its_id() {
    init_tracing();
    let catalog = catalog();
    let ids = matching_license_ids(&catalog, MIT_TEXT);
    assert!(ids.contains(&"MIT".to_string()));
    assert_eq!(ids, vec!["MIT", "MIT-Old"]);
}

#[test]
fn source_header_matches_exactly() {
    let catalog = catalog();
    assert_eq!(matching_license_ids(&catalog, WIDGET_HEADER), vec!["MIT", "MIT-Old"]);
}

#[test]
fn source_file_contains_license() {
    let catalog = catalog();
    assert!(matching_license_ids(&catalog, WIDGET_MAIN).is_empty());
    assert_eq!(
        matching_license_ids_within_text(&catalog, WIDGET_MAIN, None),
        vec!["MIT", "MIT-Old"]
    );
    assert_eq!(
        matching_license_ids_within_text(&catalog, WIDGET_MAIN, Some(&["0BSD", "mit"][..])),
        vec!["MIT"]
    );
}

#[test]
fn exception_scan() {
    let catalog = catalog();
    let wrapped = format!("# {}", LINKING_EXCEPTION.trim());
    assert_eq!(
        matching_exception_ids(&catalog, &wrapped),
        vec!["Sample-linking-exception"]
    );
    assert!(matching_exception_ids(&catalog, MIT_TEXT).is_empty());
}

#[test]
fn configured_scanner_skips_deprecated_entries() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("compare.yaml");
    let comparer = LicenseComparer::from_file(path).expect("fixture config loads");
    assert_eq!(
        comparer.scan_config(),
        ScanConfig {
            parallel: false,
            include_deprecated: false,
        }
    );
    assert_eq!(comparer.matcher().config().context_tokens, 4);

    let catalog = catalog();
    let scanner = comparer.scanner(&catalog).expect("valid config");
    assert_eq!(scanner.matching_license_ids(MIT_TEXT), vec!["MIT"]);
    assert_eq!(
        scanner.matching_license_ids_within_text(WIDGET_MAIN, None),
        vec!["MIT"]
    );
}

#[test]
fn parallel_and_sequential_scans_agree() {
    let catalog = catalog();
    let parallel = LicenseComparer::new(
        Default::default(),
        ScanConfig {
            parallel: true,
            include_deprecated: true,
        },
    )
    .expect("valid config");
    let sequential = LicenseComparer::new(
        Default::default(),
        ScanConfig {
            parallel: false,
            include_deprecated: true,
        },
    )
    .expect("valid config");

    for text in [MIT_TEXT, WIDGET_HEADER, WIDGET_MAIN, LINKING_EXCEPTION, ""] {
        let left = parallel.scanner(&catalog).expect("scanner");
        let right = sequential.scanner(&catalog).expect("scanner");
        assert_eq!(left.matching_license_ids(text), right.matching_license_ids(text));
        assert_eq!(
            left.matching_license_ids_within_text(text, None),
            right.matching_license_ids_within_text(text, None)
        );
    }
}

#[test]
fn standard_license_helpers() {
    let catalog = catalog();
    let comparer = LicenseComparer::default();
    let mit = catalog.license("MIT").expect("present");
    assert!(comparer.is_standard_license_within_text(mit, WIDGET_MAIN));
    assert!(!comparer.is_standard_license_within_text(mit, LINKING_EXCEPTION));

    let exception = catalog
        .exception("sample-linking-exception")
        .expect("present");
    let result = comparer
        .is_text_standard_exception(exception, LINKING_EXCEPTION)
        .expect("plain text parses");
    assert!(!result.difference_found, "{}", result.message);

    let broken = catalog.license("Broken-1.0").expect("present");
    assert!(comparer.is_text_standard_license(broken, "anything").is_err());
    assert!(!comparer.is_standard_license_within_text(broken, "anything"));
}

#[test]
fn license_uris() {
    assert_eq!(license_uri_to_id("http://spdx.org/licenses/MIT"), "MIT");
    assert_eq!(license_uri_to_id("https://spdx.org/licenses/0BSD"), "0BSD");
    assert_eq!(license_uri_to_id("MIT"), "MIT");
}

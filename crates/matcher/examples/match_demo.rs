use std::error::Error;

use matcher::{CatalogEntry, CatalogScanner, LicenseCatalog, TemplateMatcher};

const TEMPLATE: &str = "<<beginOptional>>The Widget License<<endOptional>>\n\
    Copyright <<var;name=\"copyright\";original=\"(c) <year> <owner>\";match=\".{0,200}\">>\n\
    Redistribution is permitted provided that this notice is retained.";

const TEXT: &str = "The Widget License\n\
    Copyright (c) <year> <owner>\n\
    Redistribution is permitted provided that this notice is retained.";

const HEADER: &str = "// Copyright (C) 2024 Example Org\n\
    // Redistribution is permitted provided that this notice is retained.\n";

const ALTERED: &str = "# Copyright 2024 Example Org\n\
    # Redistribution is permitted provided that this notice is removed.\n";

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("matcher=debug")
        .try_init()
        .map_err(|err| err.to_string())?;

    let matcher = TemplateMatcher::default();
    for (label, text) in [("header", HEADER), ("altered", ALTERED)] {
        let result = matcher.compare(TEMPLATE, text)?;
        if result.difference_found {
            println!("{label}: {} at {:?}", result.message, result.differences);
        } else {
            println!(
                "{label}: matches, required regions {:?}",
                result.matching_non_optional_regions
            );
        }
    }

    let catalog = LicenseCatalog::new()
        .with_license(CatalogEntry::new("Widget-1.0", TEXT).with_template(TEMPLATE));
    let source = format!("{HEADER}\nfn main() {{}}\n");
    let scanner = CatalogScanner::new(&catalog);
    println!("exact: {:?}", scanner.matching_license_ids(&source));
    println!(
        "within text: {:?}",
        scanner.matching_license_ids_within_text(&source, None)
    );
    Ok(())
}

#![no_main]

//! Fuzz target for placeholder resolution
//!
//! Resolves arbitrary text against a fixed property source. Resolution must
//! never panic, and text without `${` must come back unchanged.

use injector_bundle::{ApplicationContext, DiError, MapPropertySource};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

fuzz_target!(|text: &str| {
    let context = ApplicationContext::new();
    context.property_sources().add_first(Arc::new(MapPropertySource::from_pairs(
        "fuzz",
        [("a", "1"), ("b.c[0]", "${a}"), ("", "empty")],
    )));

    match context.resolve_placeholders(text) {
        Ok(resolved) => {
            if !text.contains("${") {
                assert_eq!(resolved, text);
            }
        }
        Err(DiError::UnresolvablePlaceholder { text: reported, .. }) => assert_eq!(reported, text),
        Err(other) => panic!("unexpected error: {other}"),
    }
});

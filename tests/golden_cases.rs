//! Golden test cases for placeholder substitution.
//!
//! Each test case is a directory under `tests/cases/` containing:
//! - `input.md` - Source document
//! - `expected.md` - Expected substituted content (defaults to the input)
//! - `mapfence.toml` - (Optional) Config to test dialects and policies
//!
//! Run with `UPDATE_EXPECTED=1 cargo test` to regenerate expected outputs.

use mapfence::{Config, extract};
use mapfence::recompose::recompose;
use std::{fs, path::Path};

/// Load config from test case directory if it exists.
fn load_test_config(dir: &Path) -> Option<Config> {
    let config_path = dir.join("mapfence.toml");
    if config_path.exists() {
        let content = fs::read_to_string(config_path).ok()?;
        toml::from_str(&content).ok()
    } else {
        None
    }
}

/// Run a single golden test case.
fn run_golden_case(case_name: &str) {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("cases")
        .join(case_name);

    let update_expected = std::env::var_os("UPDATE_EXPECTED").is_some();

    let input_path = dir.join("input.md");
    let expected_path = dir.join("expected.md");
    let config = load_test_config(&dir);

    // Read input file - preserve line endings exactly
    let input = fs::read_to_string(&input_path)
        .unwrap_or_else(|_| panic!("No input file found in {}", case_name));

    let substitution = extract(&input, config.clone());
    let output = substitution.content.clone();

    // Substituting placeholders back with their own tokens must give the same text
    let tokens: Vec<String> = substitution
        .placeholders
        .iter()
        .map(|p| p.token.clone())
        .collect();
    let rebuilt: String = recompose(&substitution, tokens)
        .into_iter()
        .map(|segment| match segment {
            mapfence::Segment::Text(text) => text,
            mapfence::Segment::Widget(token) => token,
        })
        .collect();
    similar_asserts::assert_eq!(output, rebuilt, "recompose mismatch: {}", case_name);

    // Extraction is deterministic
    let again = extract(&input, config);
    similar_asserts::assert_eq!(output, again.content, "determinism: {}", case_name);

    if update_expected {
        fs::write(&expected_path, &output).unwrap();
        return;
    }

    let expected = fs::read_to_string(&expected_path).unwrap_or_else(|_| input.clone());

    similar_asserts::assert_eq!(expected, output, "case: {}", case_name);
}

/// Generates one test function per case directory, so failures don't stop
/// other cases from running.
macro_rules! golden_test_cases {
    ($($case:ident),+ $(,)?) => {
        $(
            #[test]
            fn $case() {
                run_golden_case(stringify!($case));
            }
        )+
    };
}

golden_test_cases!(
    code_spans,
    crlf_fenced,
    custom_dialects,
    fenced_and_inline,
    invalid_block_dropped,
    invalid_block_preserved,
    no_maps,
    tags_in_code,
    unclosed_fence,
);

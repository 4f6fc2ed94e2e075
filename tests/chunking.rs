use bibtex_import::parse::{ParseState, PassOutcome, parse_pass};
use bibtex_import::{ChunkScheduler, NoYield, ParseRun, ParserConfig, Step};

use proptest::prelude::*;

fn config(max_matches: usize) -> ParserConfig {
    ParserConfig::default().with_max_matches(max_matches)
}

/// One `@` block with a generated key and value.
fn block() -> impl Strategy<Value = String> {
    let key = "[a-z][a-z0-9:_-]{0,8}";
    let value = "[a-zA-Z0-9 .,]{0,12}";
    prop_oneof![
        (key, value).prop_map(|(k, v)| format!("@article{{{k}, title = {{{v}}}, year = 1999}}")),
        (key, value).prop_map(|(k, v)| format!("@Book({k},\n  Title = \"{{{v}}}\",\n)")),
        (key, value).prop_map(|(k, v)| format!("@misc{{{k}, note = {{{v}}} # m}}")),
        value.prop_map(|v| format!("@string{{m = {{{v}}}}}")),
        value.prop_map(|v| format!("@comment{{{v}}}")),
        value.prop_map(|v| format!("@preamble{{\"{v}\"}}")),
    ]
}

/// Junk between blocks, never containing `@`.
fn junk() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("\n".to_owned()),
        Just("\n\n  ".to_owned()),
        Just("\n% @commented{out}\n".to_owned()),
        "[a-z ]{0,10}\n".prop_map(String::from),
    ]
}

fn bibliography() -> impl Strategy<Value = String> {
    prop::collection::vec((junk(), block()), 0..24).prop_map(|blocks| {
        blocks
            .into_iter()
            .map(|(junk, block)| junk + &block)
            .collect::<Vec<_>>()
            .concat()
    })
}

proptest! {
    #[test]
    fn chunk_size_invariance(input in bibliography(), max_matches in 1usize..6) {
        let chunked = ChunkScheduler::new(config(max_matches)).run(&input, NoYield).unwrap();
        let whole = ChunkScheduler::new(config(10000)).run(&input, NoYield).unwrap();
        prop_assert_eq!(
            serde_json::to_string(&chunked).unwrap(),
            serde_json::to_string(&whole).unwrap()
        );
    }

    #[test]
    fn passes_make_progress(input in bibliography(), max_matches in 1usize..4) {
        let blocks = input.matches('@').count() - input.matches("% @").count();
        let mut run = ParseRun::new(&input, config(max_matches));
        let mut last = 0;
        while let Step::Yielded(progress) = run.step() {
            prop_assert!(progress.offset > last);
            prop_assert!(input.is_char_boundary(progress.offset));
            last = progress.offset;
        }
        prop_assert_eq!(run.step(), Step::Completed);
        prop_assert_eq!(run.progress().passes, blocks.div_ceil(max_matches).max(1));
    }

    #[test]
    fn broken_input_never_yields_entries(input in bibliography(), cut in 0usize..400) {
        // truncating inside a block leaves it unterminated
        let cut = cut.min(input.len());
        if let Some(start) = input[..cut].rfind('@') {
            let tail = &input[start..cut];
            let commented = input[..start].ends_with("% ");
            if !commented && !tail.contains('}') && !tail.contains(')') {
                let truncated = &input[..cut];
                prop_assert!(ChunkScheduler::new(config(1)).run(truncated, NoYield).is_err());
            }
        }
    }
}

#[test]
fn test_pass_by_pass() {
    let input = "@misc{a}\n@string{m = {M}}\n@misc{b, note = m}\n@comment{c}\n@misc{c}";
    let mut state = ParseState::new();
    let mut offset = 0;
    let mut passes = 0;
    loop {
        passes += 1;
        match parse_pass(&input[offset..], &mut state, 1) {
            PassOutcome::Done => break,
            PassOutcome::Overrun { at } => offset += at.end.offset,
            PassOutcome::Syntax(failure) => panic!("{failure}"),
        }
    }
    assert_eq!(passes, 5);
    assert_eq!(state.entries().len(), 3);
    assert_eq!(state.entries()["b"].field("note"), Some("M"));
}

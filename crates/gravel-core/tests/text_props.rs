use gravel_core::{LineCol, PositionIndex, Span};
use proptest::prelude::*;

const PROPTEST_CASES: u32 = 256;

fn arb_char() -> impl Strategy<Value = char> {
    prop_oneof![
        12 => prop::sample::select(vec![
            'a', 'b', 'c', 'x', 'y', 'z', '0', '1', '2', ' ', '\t', '.', ',', '{', '}',
        ]),
        3 => Just('\n'),
        2 => Just('\r'),
        2 => Just('é'),
        2 => Just('中'),
        1 => Just('🦀'),
    ]
}

fn arb_text(min_chars: usize, max_chars: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(arb_char(), min_chars..=max_chars)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

    #[test]
    fn offset_line_col_roundtrip(text in arb_text(0, 64)) {
        let index = PositionIndex::new(&text);
        for offset in 0..=text.len() {
            let pos = index.line_col(offset).unwrap();
            prop_assert!(pos.line >= 1 && pos.col >= 1);
            prop_assert_eq!(index.offset(pos).unwrap(), offset);
        }
    }

    #[test]
    fn offsets_past_the_end_are_rejected(text in arb_text(0, 32), extra in 1usize..8) {
        let index = PositionIndex::new(&text);
        prop_assert!(index.line_col(text.len() + extra).is_err());
    }

    #[test]
    fn line_starts_follow_terminators(text in arb_text(0, 64)) {
        let index = PositionIndex::new(&text);
        for line in 1..=index.line_count() {
            let start = index.line_start(line).unwrap();
            prop_assert_eq!(index.line_col(start).unwrap(), LineCol::new(line, 1));
            if start > 0 {
                let prev = text.as_bytes()[start - 1];
                prop_assert!(prev == b'\n' || prev == b'\r');
            }
        }
    }

    #[test]
    fn stamped_ranges_are_ordered(text in arb_text(0, 48), a in 0usize..64, b in 0usize..64) {
        let (lo, hi) = (a.min(b).min(text.len()), a.max(b).min(text.len()));
        let index = PositionIndex::new(&text);
        let range = index.range(Span::new(lo, hi)).unwrap();
        prop_assert!(range.start <= range.end);
        prop_assert!((range.line, range.column) <= (range.last_line, range.last_column));
    }
}

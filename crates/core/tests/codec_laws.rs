// Property tests for the address and value codecs.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use sheetbatch_core::address::{self, Axis, LinearRange, Range, RectRange};
use sheetbatch_core::value::{self, Channel, Number, Value};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Any range shape the notation can express.
fn arb_range() -> impl Strategy<Value = Range> {
    let tab = 0u32..5;
    let row = 0u32..100_000;
    let col = 0u32..20_000;
    (tab, row, col, 0u32..500, 0u32..500, 0u8..6).prop_map(|(tab, row, col, dr, dc, shape)| {
        let rng: Range = match shape {
            0 => RectRange::cell(tab, row, col).into(),
            1 => RectRange::new(tab, row, col, Some(row + dr), Some(col + dc)).unwrap().into(),
            2 => RectRange::column_span(tab, col, col + dc).unwrap().into(),
            3 => RectRange::new(tab, row + 1, col, None, Some(col + dc)).unwrap().into(),
            4 => RectRange::new(tab, row, col, None, None).unwrap().into(),
            _ => LinearRange::new(tab, Axis::Rows, row, if dr % 2 == 0 { Some(row + dr) } else { None })
                .unwrap()
                .into(),
        };
        rng
    })
}

/// Values whose kind survives a trip through the typed channels.
fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        2 => "[a-zA-Z0-9 ,.]{0,16}".prop_map(Value::Text),
        1 => "=[A-Z]{1,2}[1-9][0-9]{0,2}\\*[0-9]{1,3}".prop_map(Value::Formula),
        2 => any::<i64>().prop_map(|i| Value::Number(Number::Int(i))),
        2 => (-1.0e12..1.0e12f64).prop_map(|f| Value::Number(Number::Float(f))),
        1 => any::<bool>().prop_map(Value::Bool),
    ]
}

fn arb_typed_channel() -> impl Strategy<Value = Channel> {
    prop_oneof![Just(Channel::UserEntered), Just(Channel::Effective)]
}

// ---------------------------------------------------------------------------
// Column labels
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn column_number_roundtrip(n in 1u32..=u32::MAX) {
        let label = address::encode_column(n).unwrap();
        prop_assert_eq!(address::decode_column(&label).unwrap(), n);
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn column_label_roundtrip(label in "[A-Z]{1,5}") {
        let n = address::decode_column(&label).unwrap();
        prop_assert_eq!(address::encode_column(n).unwrap(), label);
    }
}

// ---------------------------------------------------------------------------
// Range notation
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn notation_roundtrip(rng in arb_range()) {
        let text = rng.to_string();
        let parsed = address::parse(&text, rng.tab_id()).unwrap();
        prop_assert_eq!(parsed, rng);

        let reparsed = address::parse(&parsed.to_string(), rng.tab_id()).unwrap();
        prop_assert_eq!(reparsed, parsed);
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn qualified_notation_keeps_title(rng in arb_range(), title in "[A-Za-z][A-Za-z0-9 ']{0,10}") {
        let text = address::format_qualified(&title, &rng);
        let (parsed_title, parsed) = address::parse_qualified(&text, rng.tab_id()).unwrap();
        prop_assert_eq!(parsed_title, Some(title));
        prop_assert_eq!(parsed, rng);
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn overlap_is_symmetric(a in arb_range(), b in arb_range()) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        prop_assert!(a.overlaps(&a));
    }
}

// ---------------------------------------------------------------------------
// Value codec
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn typed_channel_roundtrip(v in arb_value(), channel in arb_typed_channel()) {
        let wire = value::encode(Some(&v), channel);
        prop_assert_eq!(value::decode(&wire, channel).unwrap(), Some(v));
    }
}

proptest! {
    #![proptest_config(config_256())]
    #[test]
    fn formatted_channel_is_text(v in arb_value()) {
        let wire = value::encode(Some(&v), Channel::Formatted);
        let decoded = value::decode(&wire, Channel::Formatted).unwrap();
        prop_assert_eq!(decoded, Some(Value::Text(v.display())));
    }
}

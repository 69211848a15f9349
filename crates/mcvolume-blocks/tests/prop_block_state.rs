use mcvolume_blocks::{BlockState, BlockStateError};
use proptest::prelude::*;

fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

fn props() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::btree_map(ident(), ident(), 0..5).prop_map(|m| m.into_iter().collect())
}

// Identifiers mixed with every character the canonical form gives meaning to
fn messy() -> impl Strategy<Value = String> {
    "[a-c:,= \\[\\]]{0,5}"
}

proptest! {
    // Parsing the canonical string gives back an equal state
    #[test]
    fn canonical_string_roundtrips(ns in ident(), name in ident(), props in props()) {
        let state = BlockState::new(ns, name, props).unwrap();
        let back = BlockState::parse(state.as_str()).unwrap();
        prop_assert_eq!(back.as_str(), state.as_str());
        prop_assert_eq!(back, state);
    }

    // A builder call either fails or yields a state that survives parsing
    #[test]
    fn built_states_roundtrip_or_are_rejected(
        ns in messy(),
        name in messy(),
        props in prop::collection::vec((messy(), messy()), 0..4),
    ) {
        if let Ok(state) = BlockState::new(ns, name, props) {
            let back = BlockState::parse(state.as_str());
            prop_assert_eq!(back, Ok(state));
        }
    }

    // Property order never changes identity
    #[test]
    fn property_order_is_irrelevant(name in ident(), props in props()) {
        let mut reversed = props.clone();
        reversed.reverse();
        let a = BlockState::new("minecraft", name.clone(), props).unwrap();
        let b = BlockState::new("minecraft", name, reversed).unwrap();
        prop_assert_eq!(a.as_str(), b.as_str());
        prop_assert_eq!(a, b);
    }

    // Every property set survives a trip through the mutable form
    #[test]
    fn mutable_roundtrip_preserves_state(ns in ident(), name in ident(), props in props()) {
        let state = BlockState::new(ns, name, props).unwrap();
        let m = state.to_mutable();
        prop_assert_eq!(m.state_str(), state.as_str());
        prop_assert_eq!(m.to_immutable(), state);
    }
}

#[test]
fn missing_namespace_defaults_to_minecraft() {
    let a: BlockState = "minecraft:stone".parse().unwrap();
    let b: BlockState = "stone".parse().unwrap();
    assert_eq!(a, b);
    assert_eq!(b.namespace(), "minecraft");
    assert_eq!(b.to_string(), "minecraft:stone");
}

#[test]
fn property_order_in_strings_is_normalized() {
    let a = BlockState::parse("minecraft:x[a=1,b=2]").unwrap();
    let b = BlockState::parse("minecraft:x[b=2,a=1]").unwrap();
    assert_eq!(a, b);
    assert_eq!(b.as_str(), "minecraft:x[a=1,b=2]");
}

#[test]
fn whitespace_around_properties_is_trimmed() {
    let s = BlockState::parse("oak_stairs[ facing = north , half=top ]").unwrap();
    assert_eq!(s.as_str(), "minecraft:oak_stairs[facing=north,half=top]");
    assert_eq!(s.prop("facing"), Some("north"));
    assert_eq!(s.prop("waterlogged"), None);
    assert_eq!(s.prop_or("waterlogged", "false"), "false");
}

#[test]
fn malformed_strings_fail() {
    assert!(matches!(
        BlockState::parse("minecraft:stone[axis=y"),
        Err(BlockStateError::UnclosedProperties(_))
    ));
    assert!(matches!(BlockState::parse(""), Err(BlockStateError::EmptyName(_))));
    assert!(matches!(BlockState::parse("minecraft:"), Err(BlockStateError::EmptyName(_))));
    assert!(matches!(BlockState::parse(":stone"), Err(BlockStateError::EmptyNamespace(_))));
    assert!(matches!(
        BlockState::parse("stone[axis]"),
        Err(BlockStateError::MalformedProperty { .. })
    ));
    assert!(matches!(
        BlockState::parse("stone[=y]"),
        Err(BlockStateError::MalformedProperty { .. })
    ));
    assert!(matches!(
        BlockState::parse("stone[a=1,a=2]"),
        Err(BlockStateError::DuplicateProperty(k)) if k == "a"
    ));
}

#[test]
fn empty_property_list_is_no_properties() {
    let s = BlockState::parse("minecraft:stone[]").unwrap();
    assert!(!s.has_props());
    assert_eq!(s, BlockState::parse("stone").unwrap());
}

#[test]
fn loose_matching_ignores_missing_keys() {
    let full = BlockState::parse("oak_log[axis=y,lit=false]").unwrap();
    let partial = BlockState::parse("oak_log[axis=y]").unwrap();
    let other_axis = BlockState::parse("oak_log[axis=x]").unwrap();
    let other_block = BlockState::parse("birch_log[axis=y]").unwrap();
    assert!(full.loosely_matches(&partial));
    assert!(partial.loosely_matches(&full));
    assert!(!full.loosely_matches(&other_axis));
    assert!(!partial.loosely_matches(&other_block));
}

#[test]
fn mutable_edits_recompute_string() {
    let base = BlockState::parse("furnace[facing=north,lit=false]").unwrap();
    let mut m = base.to_mutable();
    assert_eq!(m.state_str(), "minecraft:furnace[facing=north,lit=false]");
    m.set_prop("lit", "true").unwrap();
    m.set_prop("custom", "1").unwrap();
    assert_eq!(m.state_str(), "minecraft:furnace[custom=1,facing=north,lit=true]");
    assert_eq!(m.remove_prop("custom").as_deref(), Some("1"));
    assert_eq!(m.remove_prop("custom"), None);
    let edited: BlockState = m.into();
    assert_eq!(edited.as_str(), "minecraft:furnace[facing=north,lit=true]");
    // The source state is untouched
    assert_eq!(base.prop("lit"), Some("false"));
}

#[test]
fn builder_rejects_parts_that_break_the_canonical_form() {
    assert!(matches!(
        BlockState::new("a:b", "c", [] as [(&str, &str); 0]),
        Err(BlockStateError::ReservedCharacter { part: "namespace", .. })
    ));
    assert!(matches!(
        BlockState::new("minecraft", "x", [("a,b", "1")]),
        Err(BlockStateError::ReservedCharacter { part: "property key", .. })
    ));
    assert!(matches!(
        BlockState::new("minecraft", "x", [("a", "[1]")]),
        Err(BlockStateError::ReservedCharacter { part: "property value", .. })
    ));
    assert!(matches!(
        BlockState::new("minecraft", "", [] as [(&str, &str); 0]),
        Err(BlockStateError::EmptyName(_))
    ));
    assert!(matches!(
        BlockState::new("", "stone", [] as [(&str, &str); 0]),
        Err(BlockStateError::EmptyNamespace(_))
    ));
    assert!(matches!(
        BlockState::new("minecraft", " stone", [] as [(&str, &str); 0]),
        Err(BlockStateError::SurroundingWhitespace { part: "name", .. })
    ));
    assert!(matches!(
        BlockState::new("minecraft", "x", [("", "1")]),
        Err(BlockStateError::MalformedProperty { .. })
    ));

    // Empty values are representable
    let s = BlockState::new("minecraft", "x", [("a", "")]).unwrap();
    assert_eq!(BlockState::parse(s.as_str()).unwrap(), s);

    let mut m = BlockState::parse("stone").unwrap().to_mutable();
    assert!(matches!(m.set_prop("k=v", "1"), Err(BlockStateError::ReservedCharacter { .. })));
    assert_eq!(m.state_str(), "minecraft:stone");
}

#[test]
fn stray_brackets_in_the_name_are_rejected() {
    for s in ["stone]", "minecraft:st]one", "a:b:c"] {
        assert!(
            matches!(BlockState::parse(s), Err(BlockStateError::ReservedCharacter { part: "name", .. })),
            "{s}"
        );
    }
}

use mcvolume_blocks::{
    BlockPaletteMappings, BlockState, DEFAULT_BLOCK_ID, Palette, PaletteError, PaletteKind,
    VolumeId,
};

fn st(s: &str) -> BlockState {
    BlockState::parse(s).unwrap()
}

fn palettes(owner: VolumeId) -> [Palette; 2] {
    [
        Palette::new(owner, st("air"), PaletteKind::Hashed),
        Palette::new(owner, st("air"), PaletteKind::SmallList),
    ]
}

#[test]
fn ids_follow_first_insertion_order() {
    for mut p in palettes(VolumeId::new(1)) {
        let names = ["stone", "dirt", "grass_block[snowy=false]", "oak_planks"];
        for (i, n) in names.iter().enumerate() {
            assert_eq!(p.get_or_add(&st(n)).unwrap().id() as usize, i + 1);
        }
        // Re-adding returns the same ids
        for (i, n) in names.iter().enumerate().rev() {
            assert_eq!(p.get_or_add(&st(n)).unwrap().id() as usize, i + 1);
        }
        assert_eq!(p.len(), names.len() + 1);
        assert_eq!(p.default_entry().id(), DEFAULT_BLOCK_ID);
        assert_eq!(p.default_entry().state(), &st("minecraft:air"));
        for (i, e) in p.iter().enumerate() {
            assert_eq!(e.id() as usize, i);
        }
    }
}

#[test]
fn get_does_not_insert() {
    for mut p in palettes(VolumeId::new(2)) {
        assert!(p.get(&st("stone")).is_none());
        assert_eq!(p.len(), 1);
        let e = p.get_or_add(&st("stone")).unwrap();
        assert_eq!(p.get(&st("minecraft:stone")), Some(&e));
    }
}

#[test]
fn from_id_checks_range() {
    let [mut p, _] = palettes(VolumeId::new(3));
    p.get_or_add(&st("stone")).unwrap();
    assert_eq!(p.from_id(1).unwrap().state(), &st("stone"));
    assert_eq!(
        p.from_id(2).unwrap_err(),
        PaletteError::IndexOutOfRange { id: 2, len: 2 }
    );
}

#[test]
fn entries_carry_owner_stamp() {
    let owner = VolumeId::new(42);
    let [mut p, _] = palettes(owner);
    let e = p.get_or_add(&st("stone")).unwrap();
    assert_eq!(e.owner(), owner);
    assert_eq!(p.owner(), owner);
}

#[test]
fn unlinked_mappings_roundtrip_and_relink() {
    let [mut p, _] = palettes(VolumeId::new(5));
    for n in ["stone", "dirt", "glass"] {
        p.get_or_add(&st(n)).unwrap();
    }
    let mappings = p.to_unlinked_mappings();
    assert_eq!(mappings.len(), 4);

    let new_owner = VolumeId::new(6);
    for kind in [PaletteKind::Hashed, PaletteKind::SmallList] {
        let q = Palette::from_unlinked_mappings(&mappings, new_owner, kind).unwrap();
        assert_eq!(q.kind(), kind);
        assert_eq!(q.to_unlinked_mappings(), mappings);
        assert!(q.iter().all(|e| e.owner() == new_owner));
        assert_eq!(q.get(&st("dirt")).unwrap().id(), 2);
    }

    let stale = p.get(&st("glass")).unwrap().clone();
    p.relink(new_owner);
    assert!(p.iter().all(|e| e.owner() == new_owner));
    assert_eq!(stale.owner(), VolumeId::new(5));
    assert!(stale.same_id(p.get(&st("glass")).unwrap()));
}

#[test]
fn invalid_mappings_are_rejected() {
    let owner = VolumeId::new(9);
    assert_eq!(
        Palette::from_unlinked_mappings(&BlockPaletteMappings::new(), owner, PaletteKind::Hashed)
            .unwrap_err(),
        PaletteError::EmptyMappings
    );
    let gapped = BlockPaletteMappings::from([(0, st("air")), (2, st("stone"))]);
    assert_eq!(
        Palette::from_unlinked_mappings(&gapped, owner, PaletteKind::Hashed).unwrap_err(),
        PaletteError::MappingGap { max_id: 2, missing: 1 }
    );
    let no_zero = BlockPaletteMappings::from([(1, st("stone"))]);
    assert_eq!(
        Palette::from_unlinked_mappings(&no_zero, owner, PaletteKind::SmallList).unwrap_err(),
        PaletteError::MappingGap { max_id: 1, missing: 0 }
    );
}

#[test]
fn repeated_states_in_mappings_are_rejected() {
    let owner = VolumeId::new(10);
    let twice = BlockPaletteMappings::from([(0, st("air")), (1, st("stone")), (2, st("minecraft:air"))]);
    for kind in [PaletteKind::Hashed, PaletteKind::SmallList] {
        assert_eq!(
            Palette::from_unlinked_mappings(&twice, owner, kind).unwrap_err(),
            PaletteError::DuplicateState { id: 2, first: 0 }
        );
    }
}

#[test]
fn palette_fills_up_at_u16_capacity() {
    let mut p = Palette::new(VolumeId::new(11), st("air"), PaletteKind::Hashed);
    for i in 1..=u16::MAX as usize {
        let e = p.get_or_add(&BlockState::new("t", format!("b{i}"), [] as [(&str, &str); 0]).unwrap())
            .unwrap();
        assert_eq!(e.id() as usize, i);
    }
    assert_eq!(p.remaining_capacity(), 0);
    let err = p.get_or_add(&st("one_too_many")).unwrap_err();
    assert_eq!(err, PaletteError::Full { capacity: 65536 });
    // Existing states are still found
    assert_eq!(p.get_or_add(&st("air")).unwrap().id(), DEFAULT_BLOCK_ID);
}

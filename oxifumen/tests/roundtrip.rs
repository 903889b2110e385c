//! End-to-end decode/encode tests against canonical wire fixtures.

use oxifumen::{
    Field, FieldConsts, Flags, FumenError, Mino, Operation, Page, Rotation, decode, encode,
};

/// Resolve every page to its effective `(field, operation, comment, flags)`
/// tuple, following back-references.
fn resolved(pages: &[Page]) -> Vec<(String, Option<Operation>, String, Flags)> {
    let mut out = Vec::new();
    let mut last_comment = String::new();
    for page in pages {
        if let Some(comment) = &page.comment {
            last_comment = comment.clone();
        }
        let field = page
            .field
            .as_ref()
            .map(|f| f.string(false, true, "\n"))
            .unwrap_or_default();
        out.push((
            field,
            page.operation,
            last_comment.clone(),
            page.effective_flags(),
        ));
    }
    out
}

#[test]
fn decodes_canonical_empty_fumen() {
    let pages = decode("v115@vhAAgH").unwrap();
    assert_eq!(pages.len(), 1);

    let page = &pages[0];
    let field = page.field.as_ref().unwrap();
    assert_eq!(field.consts(), FieldConsts::V115);
    assert_eq!(field.string(true, true, "\n"), "");
    assert!(page.operation.is_none());
    assert_eq!(page.comment.as_deref(), Some(""));

    let flags = page.effective_flags();
    assert!(flags.lock);
    assert!(flags.colorize);
    assert!(!flags.mirror && !flags.rise && !flags.quiz);
    assert_eq!(page.refs.field, Some(0));
    assert_eq!(page.refs.comment, Some(0));
}

#[test]
fn reencodes_canonical_empty_fumen_identically() {
    let pages = decode("v115@vhAAgH").unwrap();
    assert_eq!(encode(&pages).unwrap(), "v115@vhAAgH");
}

#[test]
fn decodes_empty_payload_as_single_default_page() {
    let pages = decode("v115@").unwrap();
    assert_eq!(pages.len(), 1);

    let page = &pages[0];
    assert!(page.operation.is_none());
    assert_eq!(page.comment.as_deref(), Some(""));
    assert!(
        page.field
            .as_ref()
            .unwrap()
            .string(true, true, "\n")
            .is_empty()
    );
    let flags = page.effective_flags();
    assert!(!flags.lock && !flags.mirror && !flags.colorize && !flags.rise && !flags.quiz);
    assert_eq!(page.refs.field, Some(0));
    assert_eq!(page.refs.comment, Some(0));
}

#[test]
fn decodes_two_page_repeat_fumen() {
    let pages = decode("v115@vhBAgHAgH").unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1].refs.field, Some(0));
    assert_eq!(pages[1].refs.comment, Some(0));
    assert!(pages[1].comment.is_none());
    assert_eq!(encode(&pages).unwrap(), "v115@vhBAgHAgH");
}

#[test]
fn decodes_legacy_v110_empty_fumen() {
    let pages = decode("v110@7eAA4G").unwrap();
    assert_eq!(pages.len(), 1);
    let field = pages[0].field.as_ref().unwrap();
    assert_eq!(field.consts(), FieldConsts::V110);
    assert_eq!(field.string(true, true, "\n"), "");
    assert!(pages[0].operation.is_none());

    // Re-encoding always emits v115; the empty board maps onto the
    // canonical v115 fixture.
    assert_eq!(encode(&pages).unwrap(), "v115@vhAAgH");
}

#[test]
fn accepts_url_dressing_around_the_payload() {
    let direct = decode("v115@vhBAgHAgH").unwrap();
    let dressed = decode("https://example.net/?d115@vhBAg?HAgH&m=1").unwrap();
    assert_eq!(resolved(&direct), resolved(&dressed));
}

#[test]
fn roundtrips_piece_placements() {
    let op0 = Operation::new(Mino::T, Rotation::Spawn, 4, 0);
    let op1 = Operation::new(Mino::S, Rotation::Spawn, 1, 0);
    let pages = vec![
        Page {
            field: Some(Field::empty(FieldConsts::V115)),
            operation: Some(op0),
            comment: Some("opener".into()),
            ..Page::default()
        },
        Page {
            operation: Some(op1),
            ..Page::default()
        },
    ];

    let wire = encode(&pages).unwrap();
    let decoded = decode(&wire).unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].operation, Some(op0));
    assert_eq!(decoded[0].comment.as_deref(), Some("opener"));
    assert!(decoded[0].refs.comment == Some(0));

    // Page 1's field carries page 0's locked T piece.
    let field = decoded[1].field.as_ref().unwrap();
    assert_eq!(field.at(4, 0), Mino::T);
    assert_eq!(field.at(3, 0), Mino::T);
    assert_eq!(field.at(4, 1), Mino::T);
    assert_eq!(decoded[1].operation, Some(op1));
    // The comment carries over by reference.
    assert!(decoded[1].comment.is_none());
    assert_eq!(decoded[1].refs.comment, Some(0));

    // The encode/decode fixpoint: a second pass is byte-identical.
    assert_eq!(encode(&decoded).unwrap(), wire);
}

#[test]
fn roundtrips_quiz_comments() {
    let pages = vec![
        Page {
            field: Some(Field::empty(FieldConsts::V115)),
            operation: Some(Operation::new(Mino::T, Rotation::Spawn, 4, 0)),
            comment: Some("#Q=[](T)SZ".into()),
            ..Page::default()
        },
        Page {
            operation: Some(Operation::new(Mino::S, Rotation::Spawn, 1, 0)),
            ..Page::default()
        },
        Page::default(),
    ];

    let wire = encode(&pages).unwrap();
    let decoded = decode(&wire).unwrap();
    assert_eq!(decoded.len(), 3);

    assert_eq!(decoded[0].comment.as_deref(), Some("#Q=[](T)SZ"));
    assert!(decoded[0].effective_flags().quiz);

    // The quiz advances implicitly: T was placed, S becomes active.
    assert_eq!(decoded[1].comment.as_deref(), Some("#Q=[](S)Z"));
    assert_eq!(decoded[1].refs.comment, Some(0));
    assert!(decoded[1].effective_flags().quiz);

    // Then S, leaving Z active.
    assert_eq!(decoded[2].comment.as_deref(), Some("#Q=[](Z)"));

    assert_eq!(encode(&decoded).unwrap(), wire);
}

#[test]
fn rejects_inconsistent_quiz_placement() {
    let pages = vec![
        Page {
            field: Some(Field::empty(FieldConsts::V115)),
            operation: Some(Operation::new(Mino::L, Rotation::Spawn, 4, 0)),
            comment: Some("#Q=[](T)SZ".into()),
            ..Page::default()
        },
        Page::default(),
    ];
    assert!(matches!(
        encode(&pages),
        Err(FumenError::AtPage { page: 1, .. })
    ));
}

#[test]
fn roundtrips_unicode_comment() {
    let pages = vec![Page {
        field: Some(Field::empty(FieldConsts::V115)),
        comment: Some("\u{30c6}\u{30b9}\u{30c8} 50%!".into()),
        ..Page::default()
    }];
    let decoded = decode(&encode(&pages).unwrap()).unwrap();
    assert_eq!(decoded[0].comment.as_deref(), Some("\u{30c6}\u{30b9}\u{30c8} 50%!"));
}

#[test]
fn roundtrips_rise_and_mirror_pages() {
    let mut start = Field::empty(FieldConsts::V115);
    for x in 0..4 {
        start.fill(x, -1, Mino::Garbage);
    }
    start.fill(9, 0, Mino::L);

    let pages = vec![
        Page {
            field: Some(start),
            flags: Some(Flags {
                rise: true,
                ..Flags::default()
            }),
            ..Page::default()
        },
        Page {
            flags: Some(Flags {
                mirror: true,
                ..Flags::default()
            }),
            ..Page::default()
        },
        Page::default(),
    ];

    let decoded = decode(&encode(&pages).unwrap()).unwrap();
    assert_eq!(decoded.len(), 3);

    // After the rise, the garbage row became the playfield bottom row.
    let after_rise = decoded[1].field.as_ref().unwrap();
    assert_eq!(after_rise.at(0, 0), Mino::Garbage);
    assert_eq!(after_rise.at(0, -1), Mino::Empty);
    assert_eq!(after_rise.at(9, 1), Mino::L);

    // After the mirror, the L block flipped to the left edge.
    let after_mirror = decoded[2].field.as_ref().unwrap();
    assert_eq!(after_mirror.at(0, 1), Mino::L);
    assert_eq!(after_mirror.at(9, 1), Mino::Empty);
}

#[test]
fn field_backrefs_track_the_defining_page() {
    let mut other = Field::empty(FieldConsts::V115);
    other.fill(5, 5, Mino::Garbage);

    let pages = vec![
        Page {
            field: Some(Field::empty(FieldConsts::V115)),
            flags: Some(Flags {
                lock: false,
                ..Flags::default()
            }),
            ..Page::default()
        },
        Page::default(),
        Page {
            field: Some(other),
            ..Page::default()
        },
        Page::default(),
    ];

    let decoded = decode(&encode(&pages).unwrap()).unwrap();
    assert_eq!(decoded[0].refs.field, Some(0));
    assert_eq!(decoded[1].refs.field, Some(0));
    // Page 2 introduced a new field, so it defines itself.
    assert_eq!(decoded[2].refs.field, None);
    assert_eq!(decoded[3].refs.field, Some(2));
}

#[test]
fn repeat_counter_spans_many_pages() {
    let pages: Vec<Page> = (0..70)
        .map(|_| Page {
            flags: Some(Flags {
                lock: false,
                ..Flags::default()
            }),
            ..Page::default()
        })
        .collect();
    let wire = encode(&pages).unwrap();
    let decoded = decode(&wire).unwrap();
    assert_eq!(decoded.len(), 70);
    assert_eq!(encode(&decoded).unwrap(), wire);
}

#[test]
fn rejects_malformed_inputs() {
    assert!(matches!(
        decode("no marker here"),
        Err(FumenError::UnsupportedVersion)
    ));
    assert!(matches!(
        decode("v115@!!"),
        Err(FumenError::InvalidCharacter { .. })
    ));
    // A field delta with nothing behind it.
    assert!(matches!(decode("v115@vh"), Err(FumenError::AtPage { .. })));
    // An action claiming a comment that is not there.
    assert!(decode("v115@vhAAgW").is_err());
}

#[test]
fn long_sequences_get_dressed_and_undressed() {
    let pages = vec![
        Page {
            field: Some(Field::empty(FieldConsts::V115)),
            comment: Some("a comment long enough to push the payload past the \
                           forty-seven character line"
                .into()),
            ..Page::default()
        },
        Page::default(),
        Page::default(),
    ];
    let wire = encode(&pages).unwrap();
    assert!(wire.contains('?'));
    let decoded = decode(&wire).unwrap();
    assert_eq!(
        decoded[0].comment.as_deref().map(|c| c.contains("forty-seven")),
        Some(true)
    );
    assert_eq!(encode(&decoded).unwrap(), wire);
}

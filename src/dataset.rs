//! The static fragment dataset.
//!
//! Compiled-in, never mutated at runtime. Positions here are the default
//! anchors; anything the user drags is overridden through the layout store.

use crate::types::{Card, CardFlags, CardId, CardKind, EdgeAnchor, Placement};

fn placement(top_pct: f32, edge: EdgeAnchor, width: f32, rotation: f32, stack: i32) -> Placement {
    Placement {
        top_pct,
        edge,
        width,
        rotation,
        stack,
    }
}

fn quote(
    id: CardId,
    text: &'static str,
    attribution: &'static str,
    placement: Placement,
    flags: CardFlags,
) -> Card {
    Card {
        id,
        kind: CardKind::Quote,
        placement,
        text: Some(text),
        attribution: Some(attribution),
        media_url: None,
        flags,
        font_size: None,
    }
}

fn note(id: CardId, text: &'static str, placement: Placement, flags: CardFlags) -> Card {
    Card {
        id,
        kind: CardKind::Note,
        placement,
        text: Some(text),
        attribution: None,
        media_url: None,
        flags,
        font_size: None,
    }
}

/// Build the desk's card collection, in render order.
pub fn cards() -> Vec<Card> {
    use EdgeAnchor::{Left, Right};

    vec![
        quote(
            10,
            "No man ever steps in the same river twice, for it is not the same river and he is not the same man.",
            "Heraclitus",
            placement(8.0, Left(12.0), 30.0, -3.0, 1),
            CardFlags::TAPE,
        ),
        quote(
            11,
            "The temple bell stops but I still hear the sound coming out of the flowers.",
            "Matsuo Basho",
            placement(30.0, Left(28.0), 26.0, 2.0, 2),
            CardFlags::PIN,
        ),
        Card {
            font_size: Some(11.0),
            ..note(
                13,
                "Buy more index cards.",
                placement(6.0, Right(18.0), 20.0, 4.0, 3),
                CardFlags::empty(),
            )
        },
        quote(
            14,
            "Forever is composed of nows.",
            "Emily Dickinson",
            placement(52.0, Left(8.0), 22.0, -2.0, 4),
            CardFlags::TAPE,
        ),
        quote(
            16,
            "It is not that we have a short time to live, but that we waste a lot of it.",
            "Seneca",
            placement(64.0, Left(34.0), 32.0, 1.5, 5),
            CardFlags::empty(),
        ),
        note(
            17,
            "The desk remembers where you leave things. Drag a card somewhere, come back tomorrow.",
            placement(24.0, Right(6.0), 24.0, -5.0, 6),
            CardFlags::PIN,
        ),
        quote(
            19,
            "You cannot find peace by avoiding life.",
            "Virginia Woolf",
            placement(16.0, Left(5.0), 26.0, 3.0, 7),
            CardFlags::TAPE,
        ),
        quote(
            21,
            "Live the questions now.",
            "Rainer Maria Rilke",
            placement(78.0, Left(15.0), 22.0, -1.5, 8),
            CardFlags::empty(),
        ),
        Card {
            font_size: Some(13.0),
            ..note(
                22,
                "Ideas left loose on the desk fade faster than the ones pinned down.",
                placement(42.0, Right(30.0), 28.0, 2.5, 9),
                CardFlags::PIN,
            )
        },
        Card {
            id: 24,
            kind: CardKind::Media,
            placement: placement(58.0, Right(10.0), 34.0, -2.0, 10),
            text: None,
            attribution: Some("Field recording: the reading room"),
            media_url: Some("https://www.youtube.com/watch?v=EUo0ncJX19A"),
            flags: CardFlags::TAPE,
            font_size: None,
        },
    ]
}

// =============================================================================
// Tests
// =============================================================================

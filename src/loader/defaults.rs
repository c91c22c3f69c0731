//! Built-in tables of the standard game

use crate::core::{Board, BoardField, Color, EventCard, EventKind, EventScope};
use crate::loader::tables::{BagEntry, ChipSpec, PriceEntry};

/// `(color, name, [(value, count)])`
const INVENTORY: [(Color, &str, &[(u8, u32)]); 9] = [
    (Color::Gray, "Knallerbse", &[(1, 23), (2, 16), (3, 7)]),
    (Color::Orange, "Kürbis", &[(1, 32), (6, 20)]),
    (Color::Red, "Fliegenpilz", &[(1, 18), (2, 13), (4, 15)]),
    (Color::Blue, "Krähenschädel", &[(1, 22), (2, 15), (4, 15)]),
    (Color::Yellow, "Alraunwurzel", &[(1, 19), (2, 11), (4, 15)]),
    (Color::Green, "Kreuzspinne", &[(1, 25), (2, 15), (4, 18)]),
    (Color::Purple, "Geisteratem", &[(1, 23)]),
    (Color::Black, "Totenkopffalter", &[(1, 26)]),
    (Color::GreenRed, "Narrenkraut", &[(1, 25)]),
];

/// `(coins, score, ruby)` per track position
const BOARD: [(u32, u32, bool); 54] = [
    (0, 0, false),
    (0, 0, false),
    (0, 0, false),
    (0, 0, false),
    (0, 0, false),
    (0, 0, true),
    (6, 1, false),
    (7, 1, false),
    (8, 1, false),
    (9, 1, true),
    (10, 2, false),
    (11, 2, false),
    (12, 2, false),
    (13, 2, true),
    (14, 3, false),
    (15, 3, false),
    (15, 3, true),
    (16, 3, false),
    (16, 4, false),
    (17, 4, false),
    (17, 4, true),
    (18, 4, false),
    (18, 5, false),
    (19, 5, false),
    (19, 5, true),
    (20, 5, false),
    (20, 6, false),
    (21, 6, false),
    (21, 6, true),
    (22, 7, false),
    (22, 7, true),
    (23, 7, false),
    (23, 8, false),
    (24, 8, false),
    (24, 8, true),
    (25, 9, false),
    (25, 9, true),
    (26, 9, false),
    (26, 10, false),
    (27, 10, false),
    (27, 10, true),
    (28, 11, false),
    (28, 11, true),
    (29, 11, false),
    (29, 12, false),
    (30, 12, false),
    (30, 12, true),
    (31, 12, false),
    (31, 13, false),
    (32, 13, false),
    (32, 13, true),
    (33, 14, false),
    (33, 14, true),
    (33, 15, false),
];

const PRICES: [(Color, u8, u32); 15] = [
    (Color::Orange, 1, 3),
    (Color::Blue, 1, 5),
    (Color::Blue, 2, 10),
    (Color::Blue, 4, 19),
    (Color::Red, 1, 6),
    (Color::Red, 2, 10),
    (Color::Red, 4, 16),
    (Color::Yellow, 1, 8),
    (Color::Yellow, 2, 12),
    (Color::Yellow, 4, 18),
    (Color::Green, 1, 4),
    (Color::Green, 2, 8),
    (Color::Green, 4, 14),
    (Color::Purple, 1, 9),
    (Color::Black, 1, 10),
];

pub fn standard_inventory() -> Vec<ChipSpec> {
    INVENTORY
        .iter()
        .flat_map(|&(color, name, counts)| {
            counts.iter().map(move |&(value, count)| ChipSpec {
                color,
                value,
                count,
                name: name.to_string(),
            })
        })
        .collect()
}

/// The 54-field scoring track
pub fn standard_board() -> Board {
    Board::new(
        BOARD
            .iter()
            .map(|&(coins, score, ruby)| BoardField::new(coins, score, ruby))
            .collect(),
    )
}

pub fn standard_prices() -> Vec<PriceEntry> {
    PRICES
        .iter()
        .map(|&(color, value, price)| PriceEntry {
            color,
            value,
            price,
        })
        .collect()
}

/// 4x gray:1, 2x gray:2, 1x gray:3, 1x orange:1, 1x green:1
pub fn standard_starting_bag() -> Vec<BagEntry> {
    vec![
        BagEntry::new(Color::Gray, 1, 4),
        BagEntry::new(Color::Gray, 2, 2),
        BagEntry::new(Color::Gray, 3, 1),
        BagEntry::new(Color::Orange, 1, 1),
        BagEntry::new(Color::Green, 1, 1),
    ]
}

/// The full 25-card event deck
pub fn standard_deck() -> Vec<EventCard> {
    use EventKind::{OneShot, RoundModifier};
    use EventScope::{Global, PerPlayer};

    let cards: [(&str, EventKind, EventScope, &str, &str); 25] = [
        (
            "EV01",
            OneShot,
            PerPlayer,
            "A good start",
            "Choose: use your pre-draw bonus normally OR pass up on 1-3 of it and take 1-3 rubies instead.",
        ),
        (
            "EV02",
            OneShot,
            Global,
            "The pot is filling up",
            "Move your track marker 1 space forward.",
        ),
        (
            "EV03",
            OneShot,
            PerPlayer,
            "Donations",
            "Everyone rolls the die once and receives a bonus accordingly.",
        ),
        (
            "EV04",
            OneShot,
            PerPlayer,
            "Wheel and deal",
            "You can trade 1 ruby for any one 1-chip (not purple or black).",
        ),
        (
            "EV05",
            OneShot,
            PerPlayer,
            "Less is more",
            "All players draw 5 chips. The player(s) with the lowest sum take 1 blue 2-chip. \
             All other players receive 1 ruby. Then put all the chips back in the bag.",
        ),
        (
            "EV06",
            OneShot,
            PerPlayer,
            "An opportunistic moment",
            "Draw 4 chips from your bag. You can trade in one of them for the chip of the same color \
             with the next highest value. Take one green 1-chip if you can't make a trade. \
             Then put all the chips back in the bag.",
        ),
        (
            "EV07",
            OneShot,
            Global,
            "Beginner's bonus",
            "The player(s) with the fewest victory points receive one green 1-chip.",
        ),
        (
            "EV08",
            OneShot,
            PerPlayer,
            "Just in time",
            "Choose: take 4 victory points OR remove one gray 1-chip from your bag.",
        ),
        (
            "EV09",
            OneShot,
            PerPlayer,
            "But you only get to choose one",
            "Choose: take 1 black chip OR any one 2-chip OR 3 rubies.",
        ),
        (
            "EV10",
            RoundModifier,
            PerPlayer,
            "Rat infestation",
            "Double the pre-draw bonus in this round.",
        ),
        (
            "EV11",
            OneShot,
            PerPlayer,
            "Rats are your friends",
            "Choose: take any one 4-chip OR 1 victory point for each point of pre-draw bonus you will receive.",
        ),
        (
            "EV12",
            OneShot,
            Global,
            "Alms",
            "The player(s) with the fewest rubies receive 1 ruby.",
        ),
        (
            "EV13",
            OneShot,
            PerPlayer,
            "Choose wisely - I.",
            "Choose: move your track marker 2 spaces forward OR take 1 purple chip.",
        ),
        (
            "EV14",
            OneShot,
            PerPlayer,
            "Choose wisely - II.",
            "Choose: move your track marker 2 spaces forward OR take 1 purple chip.",
        ),
        (
            "EV15",
            RoundModifier,
            Global,
            "Well stirred",
            "In this round, you may put the first gray chip you draw back into the bag.",
        ),
        (
            "EV16",
            RoundModifier,
            Global,
            "Strong ingredient",
            "Beginning with the start player: if you stopped without an explosion, \
             draw up to 5 chips from your bag and place 1 of them in your pot.",
        ),
        (
            "EV17",
            RoundModifier,
            Global,
            "A second chance",
            "After the first 5 chips have landed in your pot, choose: continue OR begin the round \
             all over again. Possible only once.",
        ),
        (
            "EV18",
            RoundModifier,
            Global,
            "Seasoned perfectly",
            "If your gray chips total exactly 7 at the end of the round, move your track marker 1 space forward.",
        ),
        (
            "EV19",
            RoundModifier,
            Global,
            "Magic potion",
            "At the end of the round, all the potions get a free refill.",
        ),
        (
            "EV20",
            RoundModifier,
            Global,
            "Living in luxury",
            "The threshold for gray chips is raised in this round from 7 to 9.",
        ),
        (
            "EV21",
            RoundModifier,
            Global,
            "Malicious joy",
            "If your pot explodes in this round, the player to your left gets any one 2-chip.",
        ),
        (
            "EV22",
            RoundModifier,
            Global,
            "Pumpkin patch party",
            "In this round, every orange chip is moved 1 extra space forward.",
        ),
        (
            "EV23",
            RoundModifier,
            Global,
            "Lucky devil",
            "Regardless of whether your pot exploded: if you reach a scoring field with a ruby \
             in this round, you get an extra 2 victory points.",
        ),
        (
            "EV24",
            RoundModifier,
            Global,
            "The pot is full",
            "The player(s) who get to roll the die in this round roll twice.",
        ),
        (
            "EV25",
            RoundModifier,
            Global,
            "Shining extra bright",
            "If you reach a scoring field with a ruby in this round, you get an extra ruby.",
        ),
    ];

    cards
        .into_iter()
        .map(|(id, kind, scope, title, description)| {
            EventCard::new(id, kind, scope, title, description)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_counts() {
        let inventory = standard_inventory();
        let gray: u32 = inventory
            .iter()
            .filter(|spec| spec.color == Color::Gray)
            .map(|spec| spec.count)
            .sum();
        assert_eq!(gray, 46);
        assert_eq!(inventory.len(), 20);
    }

    #[test]
    fn test_board_landing_rewards() {
        let board = standard_board();
        assert_eq!(board.landing(9).1, BoardField::new(9, 1, true));
        // Past the end clamps to the last field
        assert_eq!(board.landing(500), (53, BoardField::new(33, 15, false)));
    }

    #[test]
    fn test_deck_kinds() {
        let deck = standard_deck();
        let modifiers: Vec<&str> = deck
            .iter()
            .filter(|card| card.kind == EventKind::RoundModifier)
            .map(|card| card.card_id.as_str())
            .collect();
        assert_eq!(modifiers.len(), 12);
        assert!(modifiers.contains(&"EV10"));
        assert!(modifiers.contains(&"EV20"));
        assert!(!modifiers.contains(&"EV12"));
    }
}

//! Random field values for property-based tests.
//!
//! Values are built from short words separated by runs of spaces, with the
//! occasional tab or multibyte character so that char/byte confusion and
//! non-space whitespace show up in counterexamples.

use quickcheck::{Arbitrary, Gen};

const ALPHABET: &[char] = &['a', 'b', 'z', 'X', '1', '{', '}', '$', '.', 'é', '日', '\t'];

/// A field value made of space-separated words.
#[derive(Clone, Debug)]
pub struct SpacedText(pub String);

impl Arbitrary for SpacedText {
    fn arbitrary(g: &mut Gen) -> Self {
        let words = usize::arbitrary(g) % 6;
        let mut text = String::new();

        for i in 0..words {
            if i > 0 || bool::arbitrary(g) {
                let spaces = 1 + usize::arbitrary(g) % 3;
                text.extend(std::iter::repeat_n(' ', spaces));
            }
            let len = 1 + usize::arbitrary(g) % 5;
            for _ in 0..len {
                text.push(*g.choose(ALPHABET).unwrap_or(&'a'));
            }
        }

        if bool::arbitrary(g) {
            text.push(' ');
        }

        SpacedText(text)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let chars: Vec<char> = self.0.chars().collect();
        Box::new((0..chars.len()).rev().map(move |skip| {
            SpacedText(
                chars
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != skip)
                    .map(|(_, c)| *c)
                    .collect(),
            )
        }))
    }
}

impl SpacedText {
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

/// A caret offset that may overshoot the value it is paired with.
#[derive(Clone, Copy, Debug)]
pub struct Caret(pub usize);

impl Arbitrary for Caret {
    fn arbitrary(g: &mut Gen) -> Self {
        Caret(usize::arbitrary(g) % 40)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.0.shrink().map(Caret))
    }
}

//! Seeded placeholder text: people, sentences and paragraphs.
//!
//! `LoremText` owns its own `ChaCha8Rng`, seeded from the run seed, so the
//! prose it produces does not shift when the engine draws more or fewer
//! numbers from its own generator.

use crate::types::Developer;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure", "in", "reprehenderit",
    "voluptate", "velit", "esse", "cillum", "fugiat", "nulla", "pariatur", "excepteur", "sint",
    "occaecat", "cupidatat", "non", "proident", "sunt", "culpa", "qui", "officia", "deserunt",
    "mollit", "anim", "id", "est", "laborum", "perspiciatis", "unde", "omnis", "iste", "natus",
    "error", "voluptatem", "accusantium", "doloremque", "laudantium", "totam", "rem", "aperiam",
    "eaque", "ipsa", "quae", "ab", "illo", "inventore", "veritatis", "quasi", "architecto",
    "beatae", "vitae", "dicta", "explicabo", "nemo", "ipsam", "quia", "voluptas", "aspernatur",
];

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Brian", "Carla", "Dennis", "Edsger", "Frances", "Grace", "Hedy",
    "Ivan", "Joan", "Ken", "Linus", "Margaret", "Niklaus", "Olga", "Peter", "Radia", "Sophie",
    "Tim", "Ursula", "Vint", "Whitfield", "Yukihiro",
];

const LAST_NAMES: &[&str] = &[
    "Allen", "Backus", "Cerf", "Diffie", "Engelbart", "Floyd", "Goldberg", "Hamilton", "Hopper",
    "Iverson", "Johnson", "Kernighan", "Lamport", "Liskov", "McCarthy", "Naur", "Ousterhout",
    "Perlman", "Ritchie", "Stroustrup", "Thompson", "Ullman", "Wirth", "Yao", "Zuse",
];

const DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

#[derive(Debug, Clone)]
pub struct LoremText {
    rng: ChaCha8Rng,
}

impl LoremText {
    /// Marker written into snapshots in place of the generator's state.
    pub const LABEL: &'static str = "LoremText";

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn pick(&mut self, items: &[&'static str]) -> &'static str {
        items.choose(&mut self.rng).copied().unwrap_or("")
    }

    /// Vary `n` by up to ±40%, never below 1.
    fn vary(&mut self, n: usize) -> usize {
        let pct = self.rng.gen_range(60..=140);
        (n * pct / 100).max(1)
    }

    pub fn developer(&mut self) -> Developer {
        let first = self.pick(FIRST_NAMES);
        let last = self.pick(LAST_NAMES);
        let domain = self.pick(DOMAINS);
        Developer::new(
            format!("{first} {last}"),
            format!("{}.{}@{domain}", first.to_lowercase(), last.to_lowercase()),
        )
    }

    /// A capitalized sentence of about `nb_words` words, ending in a period.
    pub fn sentence(&mut self, nb_words: usize) -> String {
        let count = self.vary(nb_words);
        let mut words: Vec<String> = (0..count).map(|_| self.pick(WORDS).to_string()).collect();
        if let Some(first) = words.first_mut() {
            let mut chars = first.chars();
            if let Some(c) = chars.next() {
                *first = c.to_uppercase().chain(chars).collect();
            }
        }
        format!("{}.", words.join(" "))
    }

    /// About `nb_sentences` sentences of varying length joined by spaces.
    pub fn paragraph(&mut self, nb_sentences: usize) -> String {
        let count = self.vary(nb_sentences);
        (0..count)
            .map(|_| self.sentence(6))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_text() {
        let mut a = LoremText::seeded(7);
        let mut b = LoremText::seeded(7);
        assert_eq!(a.developer(), b.developer());
        assert_eq!(a.sentence(6), b.sentence(6));
        assert_eq!(a.paragraph(5), b.paragraph(5));
    }

    #[test]
    fn sentence_shape() {
        let mut text = LoremText::seeded(1);
        for _ in 0..50 {
            let s = text.sentence(6);
            assert!(s.ends_with('.'));
            assert!(s.chars().next().unwrap().is_uppercase());
            let words = s.split_whitespace().count();
            assert!((1..=9).contains(&words), "{words} words in {s:?}");
        }
    }

    #[test]
    fn single_word_sentence_never_empty() {
        let mut text = LoremText::seeded(3);
        for _ in 0..20 {
            assert!(text.sentence(1).len() > 1);
        }
    }

    #[test]
    fn developer_email_matches_name() {
        let mut text = LoremText::seeded(11);
        let dev = text.developer();
        let first = dev.name.split(' ').next().unwrap().to_lowercase();
        assert!(dev.email.starts_with(&first));
        assert!(dev.email.contains('@'));
    }
}

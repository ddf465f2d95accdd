use crate::config::Config;
use crate::error::Result;
use crate::template::Template;
use crate::text::LoremText;
use crate::types::Phase;
use rand::Rng;

/// Column at which blurbs are wrapped.
pub const WRAP_WIDTH: usize = 70;

const BLURB_MIN_SENTENCES: usize = 2;
const BLURB_MAX_SENTENCES: usize = 13;

/// Builds commit and merge messages:
/// `template % (ticket-or-empty, "<phase words> <sentence>\n\n<blurb>")`.
#[derive(Debug, Clone)]
pub struct MessageComposer {
    template: Template,
    general_words: String,
    merge_words: String,
    sentence_words: usize,
}

impl MessageComposer {
    pub fn new(cfg: &Config) -> Result<Self> {
        Ok(Self {
            template: cfg.message_template()?,
            general_words: cfg.words(Phase::General).join(" "),
            merge_words: cfg.words(Phase::Merge).join(" "),
            sentence_words: cfg.sentence_words,
        })
    }

    pub fn compose<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        text: &mut LoremText,
        phase: Phase,
        ticket: Option<&str>,
    ) -> String {
        let words = match phase {
            Phase::General => &self.general_words,
            Phase::Merge => &self.merge_words,
        };
        let short = text.sentence(self.sentence_words);
        let body = format!("{words} {short}\n\n{}", blurb(rng, text));
        self.template.render(&[ticket.unwrap_or(""), &body])
    }
}

/// Two messages in three carry a wrapped paragraph of explanation.
fn blurb<R: Rng + ?Sized>(rng: &mut R, text: &mut LoremText) -> String {
    if !rng.gen_ratio(2, 3) {
        return String::new();
    }
    let sentences = rng.gen_range(BLURB_MIN_SENTENCES..=BLURB_MAX_SENTENCES);
    wrap(&text.paragraph(sentences), WRAP_WIDTH)
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
pub fn wrap(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

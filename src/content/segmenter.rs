//! Splits a page's raw text into typed blocks for rendering.
//!
//! Paragraphs are separated by blank lines. Each paragraph is matched
//! against [`RULES`] in order and the first matching rule decides its
//! kind. The categories overlap (a short all-caps chapter heading is also
//! subtitle-shaped, a `-` line is both dialogue and a bullet), so the
//! order of the table is part of the behavior.

use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    ChapterTitle,
    Subtitle,
    BlockQuote,
    Dialogue,
    NumberedListItem,
    BulletListItem,
    Paragraph,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub content: String,
    /// List marker (`"3."` or `"•"`) for list items.
    pub marker: Option<String>,
}

impl Block {
    fn new(kind: BlockKind, content: &str) -> Self {
        Self {
            kind,
            content: content.to_string(),
            marker: None,
        }
    }
}

struct Rule {
    kind: BlockKind,
    matches: fn(&str) -> bool,
    build: fn(BlockKind, &str) -> Block,
}

/// Classification rules, highest priority first.
const RULES: &[Rule] = &[
    Rule {
        kind: BlockKind::ChapterTitle,
        matches: is_chapter_title,
        build: verbatim,
    },
    Rule {
        kind: BlockKind::Subtitle,
        matches: is_subtitle,
        build: verbatim,
    },
    Rule {
        kind: BlockKind::BlockQuote,
        matches: is_block_quote,
        build: unquote,
    },
    Rule {
        kind: BlockKind::Dialogue,
        matches: is_dialogue,
        build: strip_dash,
    },
    Rule {
        kind: BlockKind::NumberedListItem,
        matches: is_numbered_item,
        build: numbered_item,
    },
    Rule {
        kind: BlockKind::BulletListItem,
        matches: is_bullet_item,
        build: bullet_item,
    },
];

const OPEN_QUOTE: char = '“';
const CLOSE_QUOTE: char = '”';
const BLOCK_QUOTE_MIN_CHARS: usize = 100;

static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());
static CHAPTER_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(CAPÍTULO|APÊNDICE|SUMÁRIO|AGRADECIMENTOS|NOTAS|SOBRE O AUTOR|CONHEÇA OUTROS|INTRODUÇÃO|PREFÁCIO)",
    )
    .unwrap()
});
static PART_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(Primeira|Segunda|Terceira|Quarta)\s+parte:").unwrap()
});
static NUMBERED_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+\.)").unwrap());

/// Segments `text` into blocks in reading order. Blank input yields no
/// blocks.
pub fn segment(text: &str) -> Vec<Block> {
    let normalized = EXCESS_NEWLINES.replace_all(text, "\n\n");

    PARAGRAPH_BREAK
        .split(&normalized)
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .map(classify)
        .collect()
}

/// Classifies a single trimmed, non-empty paragraph.
pub fn classify(paragraph: &str) -> Block {
    RULES
        .iter()
        .find(|rule| (rule.matches)(paragraph))
        .map(|rule| (rule.build)(rule.kind, paragraph))
        .unwrap_or_else(|| Block::new(BlockKind::Paragraph, paragraph))
}

fn is_chapter_title(text: &str) -> bool {
    CHAPTER_TITLE.is_match(text)
}

fn is_subtitle(text: &str) -> bool {
    PART_HEADING.is_match(text) || is_short_upper_case(text)
}

fn is_short_upper_case(text: &str) -> bool {
    let len = text.chars().count();
    len > 3 && len < 60 && text == text.to_uppercase() && !text.ends_with(['.', '!', '?'])
}

fn is_block_quote(text: &str) -> bool {
    text.starts_with(OPEN_QUOTE)
        && text.ends_with(CLOSE_QUOTE)
        && text.chars().count() > BLOCK_QUOTE_MIN_CHARS
}

fn is_dialogue(text: &str) -> bool {
    text.starts_with(['—', '-'])
}

fn is_numbered_item(text: &str) -> bool {
    NUMBERED_MARKER.is_match(text)
}

fn is_bullet_item(text: &str) -> bool {
    text.starts_with(['-', '•'])
}

fn verbatim(kind: BlockKind, text: &str) -> Block {
    Block::new(kind, text)
}

fn unquote(kind: BlockKind, text: &str) -> Block {
    let inner = text.strip_prefix(OPEN_QUOTE).unwrap_or(text);
    let inner = inner.strip_suffix(CLOSE_QUOTE).unwrap_or(inner);
    Block::new(kind, inner)
}

/// Removes one leading dash together with the single space after it.
/// Anything else is kept as written.
fn strip_dash(kind: BlockKind, text: &str) -> Block {
    let inner = text
        .strip_prefix("— ")
        .or_else(|| text.strip_prefix("- "))
        .unwrap_or(text);
    Block::new(kind, inner)
}

fn numbered_item(kind: BlockKind, text: &str) -> Block {
    let marker = NUMBERED_MARKER
        .find(text)
        .map(|m| m.as_str())
        .unwrap_or_default();
    Block {
        kind,
        content: text[marker.len()..].trim().to_string(),
        marker: Some(marker.to_string()),
    }
}

fn bullet_item(kind: BlockKind, text: &str) -> Block {
    let content = text.strip_prefix(['-', '•']).unwrap_or(text).trim();
    Block {
        kind,
        content: content.to_string(),
        marker: Some("•".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<BlockKind> {
        segment(text).into_iter().map(|b| b.kind).collect()
    }

    #[test]
    fn chapter_title_then_paragraph() {
        let blocks = segment("CAPÍTULO 1: O Início\n\nTexto normal aqui.");

        assert_eq!(
            blocks,
            vec![
                Block::new(BlockKind::ChapterTitle, "CAPÍTULO 1: O Início"),
                Block::new(BlockKind::Paragraph, "Texto normal aqui."),
            ]
        );
    }

    #[test]
    fn chapter_keywords_are_case_insensitive() {
        assert_eq!(kinds("Capítulo 3: Trocar"), vec![BlockKind::ChapterTitle]);
        assert_eq!(kinds("sobre o autor"), vec![BlockKind::ChapterTitle]);
        assert_eq!(kinds("Introdução"), vec![BlockKind::ChapterTitle]);
    }

    #[test]
    fn short_upper_case_chapter_heading_stays_chapter_title() {
        assert_eq!(kinds("AGRADECIMENTOS"), vec![BlockKind::ChapterTitle]);
    }

    #[test]
    fn short_upper_case_line_is_subtitle() {
        let blocks = segment("ISSO É IMPORTANTE\n\nTexto.");

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], Block::new(BlockKind::Subtitle, "ISSO É IMPORTANTE"));
        assert_eq!(blocks[1].kind, BlockKind::Paragraph);
    }

    #[test]
    fn subtitle_shape_boundaries() {
        // Three characters is too short, terminal punctuation disqualifies.
        assert_eq!(kinds("SIM"), vec![BlockKind::Paragraph]);
        assert_eq!(kinds("ISSO É IMPORTANTE!"), vec![BlockKind::Paragraph]);
        assert_eq!(kinds(&"A".repeat(60)), vec![BlockKind::Paragraph]);
        assert_eq!(kinds(&"A".repeat(59)), vec![BlockKind::Subtitle]);
    }

    #[test]
    fn part_heading_is_subtitle() {
        assert_eq!(
            kinds("Segunda parte: Explorar, como discernir o pouco vital"),
            vec![BlockKind::Subtitle]
        );
        assert_eq!(kinds("primeira PARTE: a essência"), vec![BlockKind::Subtitle]);
    }

    #[test]
    fn numbered_items_split_marker() {
        let blocks = segment("1. Primeiro item\n\n2. Segundo item");

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, BlockKind::NumberedListItem);
        assert_eq!(blocks[0].marker.as_deref(), Some("1."));
        assert_eq!(blocks[0].content, "Primeiro item");
        assert_eq!(blocks[1].marker.as_deref(), Some("2."));
        assert_eq!(blocks[1].content, "Segundo item");
    }

    #[test]
    fn multi_digit_marker() {
        let block = classify("12. Doze passos");
        assert_eq!(block.marker.as_deref(), Some("12."));
        assert_eq!(block.content, "Doze passos");
    }

    #[test]
    fn dialogue_strips_leading_dash() {
        let blocks = segment("— Olá, disse ele.");

        assert_eq!(blocks, vec![Block::new(BlockKind::Dialogue, "Olá, disse ele.")]);
    }

    #[test]
    fn dialogue_keeps_dash_without_following_space() {
        assert_eq!(classify("—Olá").content, "—Olá");
        assert_eq!(classify("-- x").content, "-- x");
        assert_eq!(classify("—  dois espaços").content, " dois espaços");
    }

    #[test]
    fn hyphen_lines_are_dialogue_before_bullets() {
        let block = classify("- Item com hífen");
        assert_eq!(block.kind, BlockKind::Dialogue);
        assert_eq!(block.content, "Item com hífen");
    }

    #[test]
    fn bullet_items_use_dot_marker() {
        let block = classify("• Dormir bem");
        assert_eq!(block.kind, BlockKind::BulletListItem);
        assert_eq!(block.marker.as_deref(), Some("•"));
        assert_eq!(block.content, "Dormir bem");
    }

    #[test]
    fn long_curly_quote_is_block_quote() {
        let body = "Se você não priorizar sua vida, alguém o fará por você. ".repeat(2);
        let text = format!("“{}”", body.trim());

        let block = classify(&text);

        assert_eq!(block.kind, BlockKind::BlockQuote);
        assert_eq!(block.content, body.trim());
    }

    #[test]
    fn short_curly_quote_is_paragraph() {
        assert_eq!(kinds("“Menos, porém melhor.”"), vec![BlockKind::Paragraph]);
    }

    #[test]
    fn extra_newlines_do_not_create_empty_blocks() {
        let blocks = segment("Primeiro parágrafo.\n\n\n\nSegundo parágrafo.");

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].content, "Primeiro parágrafo.");
        assert_eq!(blocks[1].content, "Segundo parágrafo.");
    }

    #[test]
    fn whitespace_only_separator_lines_split() {
        assert_eq!(kinds("Um.\n   \t\nDois."), vec![BlockKind::Paragraph; 2]);
    }

    #[test]
    fn single_newlines_stay_in_paragraph() {
        let blocks = segment("linha um\nlinha dois");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].content, "linha um\nlinha dois");
    }

    #[test]
    fn blank_input_yields_nothing() {
        assert!(segment("").is_empty());
        assert!(segment("  \n\n\t \n ").is_empty());
    }

    #[test]
    fn segmentation_is_deterministic() {
        let text = "PREFÁCIO\n\nTexto.\n\n— Fala.\n\n3. Item";
        assert_eq!(segment(text), segment(text));
    }
}

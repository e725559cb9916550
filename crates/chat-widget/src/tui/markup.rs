// Light message formatting: fenced code blocks and line wrapping.
//
// Message text is plain except for ```fenced``` regions, which are shown as
// preformatted code. A fence without a closing partner is left as literal
// text.

use ratatui::text::Span;

/// A run of message content with uniform formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Code(String),
}

const FENCE: &str = "```";

/// Split message content into text and code segments.
///
/// Fences pair up left to right. Empty text between adjacent blocks is
/// dropped. Code keeps its first line (usually a language tag) but loses the
/// newline right after the opening fence and right before the closing one.
pub fn parse(content: &str) -> Vec<Segment> {
    let pieces: Vec<&str> = content.split(FENCE).collect();
    // An even piece count means the last fence has no partner.
    let paired = if pieces.len() % 2 == 0 {
        pieces.len() - 1
    } else {
        pieces.len()
    };

    let mut segments = Vec::new();
    for (i, piece) in pieces[..paired].iter().enumerate() {
        if i % 2 == 1 {
            let code = piece.strip_prefix('\n').unwrap_or(piece);
            let code = code.strip_suffix('\n').unwrap_or(code);
            segments.push(Segment::Code(code.to_string()));
        } else if !piece.is_empty() {
            segments.push(Segment::Text(piece.to_string()));
        }
    }

    if paired < pieces.len() {
        // Unpaired tail: keep the fence and everything after it as text.
        let tail = format!("{FENCE}{}", pieces[paired]);
        match segments.last_mut() {
            Some(Segment::Text(text)) => text.push_str(&tail),
            _ => segments.push(Segment::Text(tail)),
        }
    }

    segments
}

/// Hard-wrap a single line to `width` terminal columns. Double-width
/// characters (CJK, emoji) count as two. A character wider than `width`
/// gets a line of its own. Always returns at least one (possibly empty) line.
pub fn wrap(line: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for c in line.chars() {
        let w = char_width(c);
        if current_width + w > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(c);
        current_width += w;
    }
    lines.push(current);
    lines
}

/// Display width of a single character, as ratatui will lay it out.
fn char_width(c: char) -> usize {
    let mut buf = [0u8; 4];
    Span::raw(&*c.encode_utf8(&mut buf)).width()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

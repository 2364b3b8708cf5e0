//! Interleaving rendered widgets with the surrounding content.

use crate::substitute::Substitution;

/// A piece of recomposed output.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment<W> {
    /// Literal content, to be rendered by the host's document pipeline.
    Text(String),
    /// The widget for one map declaration.
    Widget(W),
}

impl<W> Segment<W> {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::Widget(_) => None,
        }
    }

    pub fn as_widget(&self) -> Option<&W> {
        match self {
            Self::Text(_) => None,
            Self::Widget(w) => Some(w),
        }
    }
}

fn flush<W>(segments: &mut Vec<Segment<W>>, text: &mut String) {
    if !text.is_empty() {
        segments.push(Segment::Text(std::mem::take(text)));
    }
}

/// Split substituted content at the recorded placeholder ranges and put
/// `widgets` in their place.
///
/// The i-th placeholder receives the i-th widget. The content is never
/// searched for tokens, so placeholder-looking text that was not inserted by
/// the substitution stays literal. Empty literal segments are dropped.
/// Content without maps comes back as one text segment.
pub fn recompose<W>(
    substitution: &Substitution,
    widgets: impl IntoIterator<Item = W>,
) -> Vec<Segment<W>> {
    if substitution.placeholders.is_empty() {
        return vec![Segment::Text(substitution.content.clone())];
    }

    let content = substitution.content.as_str();
    let mut widgets = widgets.into_iter();
    let mut segments = Vec::with_capacity(substitution.placeholders.len() * 2 + 1);
    let mut text = String::new();
    let mut cursor = 0;

    for placeholder in &substitution.placeholders {
        let range = placeholder.range.clone();
        let token = match content.get(range.clone()) {
            Some(token) if range.start >= cursor => token,
            _ => {
                log::warn!("Placeholder {} has a stale range, skipping", placeholder.index);
                continue;
            }
        };
        text.push_str(&content[cursor..range.start]);
        cursor = range.end;

        match widgets.next() {
            Some(widget) => {
                flush(&mut segments, &mut text);
                segments.push(Segment::Widget(widget));
            }
            None => {
                log::warn!("No widget for {}, keeping it as text", token);
                text.push_str(token);
            }
        }
    }
    text.push_str(&content[cursor..]);
    flush(&mut segments, &mut text);

    segments
}

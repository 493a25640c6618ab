use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq)]
pub struct Truncated {
    pub text: String,
    pub truncated: bool,
}

/// Length in user-perceived characters
pub fn display_len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Fit `text` into `max` characters, cutting at the last word boundary and
/// appending `ellipsis`. Whitespace runs are collapsed first. A single word
/// longer than the budget is cut mid-word. Never returns more than `max`.
pub fn truncate_at_word(text: &str, max: usize, ellipsis: &str) -> Truncated {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if display_len(&text) <= max {
        return Truncated {
            text,
            truncated: false,
        };
    }

    let graphemes: Vec<&str> = text.graphemes(true).collect();
    let marker_len = display_len(ellipsis);
    if max <= marker_len {
        return Truncated {
            text: graphemes[..max].concat(),
            truncated: true,
        };
    }

    let budget = max - marker_len;
    let head = graphemes[..budget].concat();
    let cut_on_boundary = !is_word_part(&graphemes, budget);

    let kept = if cut_on_boundary {
        head.as_str()
    } else {
        match head.rfind(char::is_whitespace) {
            Some(pos) => &head[..pos],
            None => head.as_str(),
        }
    };

    let mut kept = kept.trim_end_matches(|c: char| c.is_whitespace() || ",;:.-".contains(c));
    if kept.is_empty() {
        kept = head.as_str();
    }

    Truncated {
        text: format!("{}{}", kept, ellipsis),
        truncated: true,
    }
}

fn is_alphanumeric(grapheme: &str) -> bool {
    grapheme.chars().all(char::is_alphanumeric)
}

/// Apostrophes and hyphens between two letters belong to the word ("don't", "e-mail")
fn is_word_part(graphemes: &[&str], index: usize) -> bool {
    let current = graphemes[index];
    if is_alphanumeric(current) {
        return true;
    }
    if !matches!(current, "'" | "\u{2019}" | "-") || index == 0 {
        return false;
    }
    is_alphanumeric(graphemes[index - 1])
        && graphemes.get(index + 1).map_or(false, |next| is_alphanumeric(next))
}

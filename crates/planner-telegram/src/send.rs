//! Message chunking for Telegram's 4096-character limit (4090 for safety).

/// Maximum characters per Telegram message.
pub(crate) const CHUNK_MAX: usize = 4090;

/// Split `text` into chunks that fit Telegram's limit, preferring newline
/// boundaries. Reminders always fit in one chunk; only a digest with very
/// many tasks ever splits.
pub fn split_chunks(text: &str) -> Vec<String> {
    if text.len() <= CHUNK_MAX {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    for line in text.split('\n') {
        let cost = if current.is_empty() {
            line.len()
        } else {
            1 + line.len()
        };
        if !current.is_empty() && current.len() + cost > CHUNK_MAX {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    // Force-split any single line longer than the limit.
    let mut result = Vec::new();
    for chunk in chunks {
        if chunk.len() <= CHUNK_MAX {
            result.push(chunk);
        } else {
            let mut remaining = chunk.as_str();
            while remaining.len() > CHUNK_MAX {
                // The limit is in bytes; back off to a char boundary so
                // multibyte text (emoji, Cyrillic) never slices mid-char.
                let hard = floor_char_boundary(remaining, CHUNK_MAX);
                let split_at = match remaining[..hard].rfind(' ') {
                    Some(at) if at > 0 => at,
                    _ => hard,
                };
                result.push(remaining[..split_at].to_string());
                remaining = remaining[split_at..].trim_start();
            }
            if !remaining.is_empty() {
                result.push(remaining.to_string());
            }
        }
    }
    result
}

/// Largest char boundary in `s` that is `<= index`. `index` must be within
/// `s` (the force-split loop only runs while the text is over the limit).
fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_single_chunk() {
        let chunks = split_chunks("🔔 Reminder, Alice!\nIn 5 minutes:\n📝 Call Bob");
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn long_digest_splits_on_newlines() {
        let line = "📝 a fairly long weekly task description line";
        let text = vec![line; 200].join("\n");
        let chunks = split_chunks(&text);
        assert!(chunks.len() >= 2);
        for c in &chunks {
            assert!(c.len() <= CHUNK_MAX, "chunk too large: {}", c.len());
        }
    }

    #[test]
    fn oversized_single_line_force_splits() {
        let text = "x".repeat(9000);
        let chunks = split_chunks(&text);
        assert!(chunks.len() >= 2);
        for c in &chunks {
            assert!(c.len() <= CHUNK_MAX);
        }
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        // 2000 bell emoji (8000 bytes): the limit lands mid-char unless
        // the split backs off to a boundary.
        let text = "🔔".repeat(2000);
        let chunks = split_chunks(&text);
        assert!(chunks.len() >= 2);
        for c in &chunks {
            assert!(c.len() <= CHUNK_MAX);
        }
        assert_eq!(chunks.concat(), text);

        // Spaceless Cyrillic (2 bytes per char) exercises the odd offsets.
        let text = "напоминание".repeat(800);
        for c in split_chunks(&text) {
            assert!(c.len() <= CHUNK_MAX);
        }
    }
}

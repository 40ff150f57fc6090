/// Upper bound on the length (in characters) of a single command string.
///
/// The target console truncates anything longer, so oversized statements are
/// split at word boundaries before transmission.
pub const MAX_CHUNK_CHARS: usize = 200;

/// Splits free-form script text into an ordered sequence of bounded-length
/// command strings.
///
/// Newlines are treated as statement separators; statements are re-joined
/// greedily with `"; "` while the result stays within [`MAX_CHUNK_CHARS`].
pub fn chunk_script(text: &str) -> Vec<String> {
    chunk_script_with_limit(text, MAX_CHUNK_CHARS)
}

/// [`chunk_script`] with an explicit character limit.
///
/// Deterministic and idempotent for a given input and limit. Every returned
/// chunk holds at most `limit` characters, except chunks carved out of a
/// single whitespace-free run longer than the limit, which are cut hard at
/// the limit.
pub fn chunk_script_with_limit(text: &str, limit: usize) -> Vec<String> {
    debug_assert!(limit > 0, "chunk limit must be positive");
    let normalized = text.replace('\n', ";");
    let statements = normalized
        .split(';')
        .map(str::trim)
        .filter(|statement| !statement.is_empty());

    let mut chunks = Vec::new();
    let mut buffer = String::new();

    for statement in statements {
        let statement_chars = statement.chars().count();
        let buffer_chars = buffer.chars().count();
        let joined_chars = if buffer.is_empty() {
            statement_chars
        } else {
            buffer_chars + JOINER.len() + statement_chars
        };

        if joined_chars > limit {
            if !buffer.is_empty() {
                chunks.push(std::mem::take(&mut buffer));
            }
            if statement_chars > limit {
                buffer = carve_oversized(statement, limit, &mut chunks);
            } else {
                buffer.push_str(statement);
            }
        } else if buffer.is_empty() {
            buffer.push_str(statement);
        } else {
            buffer.push_str(JOINER);
            buffer.push_str(statement);
        }
    }

    if !buffer.is_empty() {
        chunks.push(buffer);
    }
    chunks
}

const JOINER: &str = "; ";

/// Repeatedly carves limit-sized prefixes off an oversized statement,
/// breaking at the last space at-or-before the limit, and returns the
/// remainder that fits.
fn carve_oversized(statement: &str, limit: usize, chunks: &mut Vec<String>) -> String {
    let mut rest = statement;
    while rest.chars().count() > limit {
        let cut = break_offset(rest, limit);
        chunks.push(rest[..cut].to_string());
        rest = rest[cut..].trim();
    }
    rest.to_string()
}

/// Byte offset at which to cut `text`, given that it is longer than `limit`
/// characters: the position of the last space at a character index in
/// `1..=limit`, or exactly `limit` characters when no such space exists.
fn break_offset(text: &str, limit: usize) -> usize {
    let offsets: Vec<usize> = text
        .char_indices()
        .map(|(offset, _)| offset)
        .take(limit + 1)
        .collect();
    let bytes = text.as_bytes();

    let mut index = limit;
    while index > 0 && bytes[offsets[index]] != b' ' {
        index -= 1;
    }
    if index == 0 {
        index = limit;
    }
    offsets[index]
}

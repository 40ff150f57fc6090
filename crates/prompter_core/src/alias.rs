/// Generated alias name for the chunk at `index`.
pub fn alias_name(prefix: &str, index: usize) -> String {
    format!("{}-{}", prefix.trim(), index)
}

/// Wraps each chunk in an `alias create` directive under a generated name,
/// chaining every command to the next one's name so that invoking the first
/// alias cascades through the whole sequence.
///
/// An empty or whitespace-only prefix disables aliasing and returns the
/// chunks unchanged.
pub fn alias_chain(chunks: &[String], prefix: &str) -> Vec<String> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return chunks.to_vec();
    }

    chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| {
            let mut command = format!("alias create {prefix}-{index} {chunk}");
            if index + 1 < chunks.len() {
                // Trailing reference to the next alias in the chain.
                command.push_str(&format!(";{prefix}-{}", index + 1));
            }
            command
        })
        .collect()
}

/// Deregistration commands for every alias in `0..=max_index`.
///
/// The bound is independent of the current chunk count: stale aliases from a
/// longer past batch may still be registered in the target.
pub fn remove_commands(prefix: &str, max_index: usize) -> Vec<String> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Vec::new();
    }
    (0..=max_index)
        .map(|index| format!("alias remove {prefix}-{index}"))
        .collect()
}

//! Numbering finalizer: `(i/N)` suffixes on split titles

use crate::document::{BlockId, ReportDocument};
use rustc_hash::FxHashMap;

/// Rewrite the visible text of every split-marked title.
///
/// Titles are grouped by their split key. A group with a single member loses
/// any suffix; larger groups are ordered by split index (document order breaks
/// ties) and each member becomes `"<base> (k/N)"`. Returns the number of groups.
/// Running this twice leaves the document unchanged.
pub fn finalize_numbering(doc: &mut ReportDocument) -> usize {
    let mut groups: Vec<Vec<(u32, BlockId)>> = Vec::new();
    let mut by_key: FxHashMap<String, usize> = FxHashMap::default();

    for id in doc.placed_blocks() {
        let Some(mark) = doc
            .block(id)
            .and_then(|block| block.kind.title())
            .and_then(|title| title.split.as_ref())
        else {
            continue;
        };
        let slot = *by_key.entry(mark.group.clone()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push((mark.index, id));
    }

    for members in &mut groups {
        // stable: equal indices keep document order
        members.sort_by_key(|(index, _)| *index);
        let total = members.len();

        for (k, (_, id)) in members.iter().enumerate() {
            let Some(title) = doc.block_mut(*id).and_then(|block| block.kind.title_mut()) else {
                continue;
            };
            let base = title.base_text();
            title.text = if total == 1 {
                base
            } else {
                format!("{} ({}/{})", base, k + 1, total)
            };
        }
    }

    log::debug!("numbered {} split groups", groups.len());
    groups.len()
}

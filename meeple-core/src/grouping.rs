//! Groups a flat user library into base games with nested expansions.

use std::collections::HashMap;

use crate::types::{GroupedGame, LibraryEntry};

/// Group a user's library entries into base-game groups with their
/// expansions nested underneath.
///
/// Two passes over the input:
///
/// 1. Every non-expansion entry opens a group keyed by its `bgg_id`.
/// 2. Every expansion entry is attached to the group keyed by its game's
///    `base_game_bgg_id`. When no such group exists (the base game is not in
///    this library, or the relationship was never set), the expansion
///    surfaces as a standalone top-level group instead of being dropped.
///
/// The host lookup only consults groups opened in pass 1, so an expansion
/// never nests under another expansion; the output is strictly two levels
/// deep. Groups come back sorted by display name, case-insensitively, with
/// each group's expansions sorted the same way.
pub fn group_library(entries: Vec<LibraryEntry>) -> Vec<GroupedGame> {
    let (bases, expansions): (Vec<_>, Vec<_>) =
        entries.into_iter().partition(|e| !e.game.is_expansion);

    let mut groups: Vec<GroupedGame> = Vec::with_capacity(bases.len());
    let mut group_index: HashMap<i64, usize> = HashMap::with_capacity(bases.len());

    for entry in bases {
        group_index.insert(entry.game.bgg_id, groups.len());
        groups.push(standalone(entry));
    }

    let mut orphans: Vec<GroupedGame> = Vec::new();
    for entry in expansions {
        let host = entry
            .game
            .base_game_bgg_id
            .and_then(|id| group_index.get(&id).copied());
        match host {
            Some(idx) => {
                let group = &mut groups[idx];
                group.expansions.push(entry);
                group.total_count += 1;
            }
            None => orphans.push(standalone(entry)),
        }
    }
    groups.extend(orphans);

    for group in &mut groups {
        group
            .expansions
            .sort_by_cached_key(|e| (e.game.display_name().to_lowercase(), e.game.bgg_id));
    }
    groups.sort_by_cached_key(|g| {
        (
            g.base.game.display_name().to_lowercase(),
            g.base.game.bgg_id,
        )
    });

    groups
}

fn standalone(entry: LibraryEntry) -> GroupedGame {
    GroupedGame {
        base: entry,
        expansions: Vec::new(),
        total_count: 1,
    }
}

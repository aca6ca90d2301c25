//! Selection for renderers without a dedicated algorithm (metadata and
//! unknown types). Each such renderer gets its own fixed selection.

use crate::comparator::Lexicographic;
use crate::format::SelectionFlags;
use crate::selector::candidate::Definition;
use crate::selector::Context;

struct OtherTrackScore {
    group_index: usize,
    track_index: usize,
    within_renderer_capabilities: bool,
    is_default: bool,
}

/// Pick one track for `renderer_index` from the groups mapped to it.
pub(crate) fn select_other(ctx: &Context<'_>, renderer_index: usize) -> Option<Definition> {
    let exceed = ctx.params.exceed_renderer_capabilities_if_necessary;
    let groups = ctx.mapped.track_groups(renderer_index);
    let capabilities = ctx.mapped.renderer_capabilities(renderer_index);

    let scores: Vec<OtherTrackScore> = groups
        .iter()
        .zip(capabilities)
        .enumerate()
        .flat_map(|(group_index, (group, group_capabilities))| {
            group
                .formats()
                .iter()
                .zip(group_capabilities)
                .enumerate()
                .filter(|(_, (_, c))| c.format_support.is_supported(exceed))
                .map(move |(track_index, (format, c))| OtherTrackScore {
                    group_index,
                    track_index,
                    within_renderer_capabilities: c.format_support.is_supported(false),
                    is_default: format.selection_flags.contains(SelectionFlags::DEFAULT),
                })
        })
        .collect();

    let ranking = Lexicographic::new()
        .then_prefer("within_renderer_capabilities", |s: &OtherTrackScore| s.within_renderer_capabilities)
        .then_prefer("default_flag", |s: &OtherTrackScore| s.is_default);

    ranking.max_by(&scores).map(|best| Definition {
        renderer_index,
        group_index: best.group_index,
        tracks: vec![best.track_index],
    })
}

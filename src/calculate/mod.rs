//! Session delta calculation.
//!
//! Turns two raw leaderboard lists (live and baseline) into per-bucket
//! wins/losses since the baseline, and renders them for the overlay:
//! - Deltas are clamped at zero per leaderboard
//! - A leaderboard missing from the baseline contributes nothing
//! - Unknown leaderboard ids and hidden brackets are skipped

use std::collections::BTreeSet;

use tracing::debug;

use crate::models::{
    lookup, BracketSize, GroupKey, GroupedTotals, Grouping, Preferences, StatRecord,
    StatSnapshot, WinLoss,
};

/// Shown instead of an empty line.
pub const PLACEHOLDER: &str = "Waiting for session...";

const SEPARATOR: &str = "  ";

/// Aggregate session deltas for one grouping.
///
/// Every bucket of the grouping is present in the result, including idle ones.
pub fn aggregate(
    live: &[StatRecord],
    baseline: &[StatRecord],
    visible_modes: &BTreeSet<BracketSize>,
    grouping: Grouping,
) -> GroupedTotals {
    let live = StatSnapshot::from_records(live);
    let baseline = StatSnapshot::from_records(baseline);
    let mut totals = GroupedTotals::empty(grouping);

    for (id, current) in live.iter() {
        let Some(info) = lookup(id) else {
            debug!("Skipping unknown leaderboard {}", id);
            continue;
        };
        if !visible_modes.contains(&info.bracket) {
            continue;
        }

        let reference = baseline.get(id).unwrap_or(current);
        let delta = current.delta_since(reference);

        let key = match grouping {
            Grouping::Size => GroupKey::Size(info.bracket),
            Grouping::Faction => GroupKey::Faction(info.faction),
            Grouping::Team => GroupKey::Side(info.bracket, info.faction.side()),
        };
        totals.accumulate(key, delta);
    }

    totals
}

/// Convenience wrapper taking the user's preferences.
pub fn aggregate_with(
    live: &[StatRecord],
    baseline: &[StatRecord],
    prefs: &Preferences,
) -> GroupedTotals {
    aggregate(live, baseline, &prefs.visible_modes, prefs.grouping)
}

/// Render as zero-padded `wins/losses`, e.g. `02/13`.
pub fn format_win_loss(totals: &WinLoss) -> String {
    format!("{:02}/{:02}", totals.wins, totals.losses)
}

/// Render the visible buckets as one overlay line.
///
/// Returns an empty string when nothing is visible; callers show
/// [`PLACEHOLDER`] in that case.
pub fn render_line(totals: &GroupedTotals, visible_modes: &BTreeSet<BracketSize>) -> String {
    totals
        .visible(visible_modes)
        .map(|(key, wl)| format!("{}:{}", key, format_win_loss(wl)))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Faction, TeamSide};
    use pretty_assertions::assert_eq;

    fn modes(list: &[BracketSize]) -> BTreeSet<BracketSize> {
        list.iter().copied().collect()
    }

    fn all_modes() -> BTreeSet<BracketSize> {
        BracketSize::ALL.into_iter().collect()
    }

    fn sample_live() -> Vec<StatRecord> {
        vec![
            StatRecord::new(2130255, 10, 4),
            StatRecord::new(2130259, 20, 11),
            StatRecord::new(2130306, 5, 5),
            StatRecord::new(2130331, 8, 2),
            StatRecord::new(2130360, 40, 38),
        ]
    }

    fn sample_baseline() -> Vec<StatRecord> {
        vec![
            StatRecord::new(2130255, 7, 4),
            StatRecord::new(2130259, 18, 9),
            StatRecord::new(2130306, 4, 5),
            StatRecord::new(2130331, 8, 2),
            StatRecord::new(2130360, 38, 40),
        ]
    }

    #[test]
    fn test_empty_baseline_gives_zero_buckets() {
        let live = vec![StatRecord::new(2130255, 10, 4)];
        let totals = aggregate(
            &live,
            &[],
            &modes(&[BracketSize::OneVsOne]),
            Grouping::Size,
        );

        assert_eq!(totals.iter().count(), 4);
        for label in ["1v1", "2v2", "3v3", "4v4"] {
            assert_eq!(totals.get_label(label), Some(&WinLoss::new(0, 0)), "{}", label);
        }
    }

    #[test]
    fn test_empty_baseline_zero_for_every_grouping() {
        for grouping in [Grouping::Size, Grouping::Faction, Grouping::Team] {
            let totals = aggregate(&sample_live(), &[], &all_modes(), grouping);
            assert!(totals.iter().all(|(_, wl)| wl.is_zero()), "{}", grouping);
        }
    }

    #[test]
    fn test_delta_by_size() {
        let live = vec![StatRecord::new(2130255, 10, 4)];
        let baseline = vec![StatRecord::new(2130255, 7, 4)];
        let totals = aggregate(&live, &baseline, &all_modes(), Grouping::Size);

        assert_eq!(totals.get_label("1v1"), Some(&WinLoss::new(3, 0)));
        assert_eq!(totals.get_label("2v2"), Some(&WinLoss::new(0, 0)));
    }

    #[test]
    fn test_delta_by_faction() {
        let live = vec![StatRecord::new(2130255, 10, 4)];
        let baseline = vec![StatRecord::new(2130255, 7, 4)];
        let totals = aggregate(&live, &baseline, &all_modes(), Grouping::Faction);

        assert_eq!(totals.get(&GroupKey::Faction(Faction::Us)), Some(&WinLoss::new(3, 0)));
        for faction in [Faction::Uk, Faction::Dak, Faction::Wehr] {
            assert_eq!(totals.get(&GroupKey::Faction(faction)), Some(&WinLoss::default()));
        }
    }

    #[test]
    fn test_unknown_id_contributes_nothing() {
        let live = vec![StatRecord::new(9999999, 50, 50)];
        let baseline = vec![StatRecord::new(9999999, 0, 0)];

        for grouping in [Grouping::Size, Grouping::Faction, Grouping::Team] {
            let totals = aggregate(&live, &baseline, &all_modes(), grouping);
            assert!(totals.total().is_zero());
        }
    }

    #[test]
    fn test_axis_only_lands_in_axis_bucket() {
        // 2v2 WEHR
        let live = vec![StatRecord::new(2130306, 9, 3)];
        let baseline = vec![StatRecord::new(2130306, 6, 1)];
        let totals = aggregate(&live, &baseline, &all_modes(), Grouping::Team);

        assert_eq!(
            totals.get(&GroupKey::Side(BracketSize::TwoVsTwo, TeamSide::Axis)),
            Some(&WinLoss::new(3, 2))
        );
        assert_eq!(
            totals.get(&GroupKey::Side(BracketSize::TwoVsTwo, TeamSide::Allies)),
            Some(&WinLoss::default())
        );
        assert_eq!(totals.total(), WinLoss::new(3, 2));
    }

    #[test]
    fn test_deltas_never_negative() {
        // Baseline exceeds live, e.g. after a stat reset
        let live = vec![StatRecord::new(2130255, 1, 0)];
        let baseline = vec![StatRecord::new(2130255, 30, 12)];
        let totals = aggregate(&live, &baseline, &all_modes(), Grouping::Size);

        assert_eq!(totals.get_label("1v1"), Some(&WinLoss::new(0, 0)));

        let totals = aggregate(&sample_live(), &sample_baseline(), &all_modes(), Grouping::Size);
        // 4v4 WEHR went 38 -> 40 wins and 40 -> 38 losses
        assert_eq!(totals.get_label("4v4"), Some(&WinLoss::new(2, 0)));
    }

    #[test]
    fn test_hidden_bracket_is_skipped() {
        let totals = aggregate(
            &sample_live(),
            &sample_baseline(),
            &modes(&[BracketSize::TwoVsTwo]),
            Grouping::Faction,
        );

        // Only 2v2 WEHR moved (+1 win)
        assert_eq!(totals.get(&GroupKey::Faction(Faction::Wehr)), Some(&WinLoss::new(1, 0)));
        assert_eq!(totals.get(&GroupKey::Faction(Faction::Dak)), Some(&WinLoss::default()));
        assert_eq!(totals.total(), WinLoss::new(1, 0));
    }

    #[test]
    fn test_missing_baseline_entry_is_zero() {
        let live = vec![
            StatRecord::new(2130255, 10, 4),
            StatRecord::new(2130300, 3, 3),
        ];
        let baseline = vec![StatRecord::new(2130255, 9, 4)];
        let totals = aggregate(&live, &baseline, &all_modes(), Grouping::Size);

        assert_eq!(totals.get_label("1v1"), Some(&WinLoss::new(1, 0)));
        assert_eq!(totals.get_label("2v2"), Some(&WinLoss::new(0, 0)));
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        for grouping in [Grouping::Size, Grouping::Faction, Grouping::Team] {
            let first = aggregate(&sample_live(), &sample_baseline(), &all_modes(), grouping);
            let second = aggregate(&sample_live(), &sample_baseline(), &all_modes(), grouping);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_totals_conserved_across_groupings() {
        let live = sample_live();
        let baseline = sample_baseline();
        let by_size = aggregate(&live, &baseline, &all_modes(), Grouping::Size).total();
        let by_faction = aggregate(&live, &baseline, &all_modes(), Grouping::Faction).total();
        let by_team = aggregate(&live, &baseline, &all_modes(), Grouping::Team).total();

        assert_eq!(by_size, WinLoss::new(8, 2));
        assert_eq!(by_size, by_faction);
        assert_eq!(by_size, by_team);
    }

    #[test]
    fn test_format_win_loss_is_zero_padded() {
        assert_eq!(format_win_loss(&WinLoss::new(2, 13)), "02/13");
        assert_eq!(format_win_loss(&WinLoss::new(0, 0)), "00/00");
        assert_eq!(format_win_loss(&WinLoss::new(104, 7)), "104/07");
    }

    #[test]
    fn test_render_line_filters_hidden_brackets() {
        let visible = modes(&[BracketSize::OneVsOne, BracketSize::ThreeVsThree]);
        let totals = aggregate(&sample_live(), &sample_baseline(), &visible, Grouping::Size);

        assert_eq!(render_line(&totals, &visible), "1v1:05/02  3v3:00/00");
    }

    #[test]
    fn test_render_line_team() {
        let visible = modes(&[BracketSize::OneVsOne]);
        let totals = aggregate(&sample_live(), &sample_baseline(), &visible, Grouping::Team);

        assert_eq!(
            render_line(&totals, &visible),
            "1v1-allies:03/00  1v1-axis:02/02"
        );
    }

    #[test]
    fn test_render_line_faction_ignores_visibility_for_buckets() {
        let visible = modes(&[BracketSize::OneVsOne]);
        let totals = aggregate(&sample_live(), &sample_baseline(), &visible, Grouping::Faction);

        assert_eq!(
            render_line(&totals, &visible),
            "US:03/00  UK:00/00  DAK:02/02  WEHR:00/00"
        );
    }

    #[test]
    fn test_render_line_empty_when_nothing_visible() {
        let visible = BTreeSet::new();
        let totals = aggregate(&sample_live(), &sample_baseline(), &visible, Grouping::Size);
        assert_eq!(render_line(&totals, &visible), "");
    }

    #[test]
    fn test_aggregate_with_preferences() {
        let prefs = Preferences::new([BracketSize::FourVsFour], Grouping::Size);
        let totals = aggregate_with(&sample_live(), &sample_baseline(), &prefs);
        assert_eq!(totals.total(), WinLoss::new(2, 0));
    }
}

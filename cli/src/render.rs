use swapix_common::games::match3::{
    AllStatistics, GameEvent, Grid, LevelCatalog, Position, Progression, Session, MAX_STARS,
};

pub fn render_grid(grid: &Grid, selected: Option<Position>) -> String {
    let size = grid.size();
    let mut out = String::from("    ");
    for col in 0..size {
        out.push_str(&format!("{:>2} ", col));
    }
    out.push('\n');

    for row in 0..size {
        out.push_str(&format!("{:>2}  ", row));
        for col in 0..size {
            let pos = Position::new(row, col);
            let symbol = grid
                .gem_type(pos)
                .map_or('.', |kind| kind.symbol());
            if selected == Some(pos) {
                out.push_str(&format!("[{}]", symbol));
            } else {
                out.push_str(&format!(" {} ", symbol));
            }
        }
        out.push('\n');
    }
    out
}

pub fn render_stars(stars: u8) -> String {
    let earned = stars.min(MAX_STARS) as usize;
    format!(
        "{}{}",
        "*".repeat(earned),
        "-".repeat(MAX_STARS as usize - earned)
    )
}

pub fn render_status(session: &Session) -> String {
    let level = session.level();
    format!(
        "Level {} - {} | Score {}/{} | Moves {} (par {})",
        level.id,
        level.name,
        session.score(),
        session.target_score(),
        session.moves_used(),
        level.ideal_moves
    )
}

pub fn describe_event(event: &GameEvent) -> String {
    match event {
        GameEvent::Swapped { from, to } => format!(
            "Swapped ({}, {}) with ({}, {})",
            from.row, from.col, to.row, to.col
        ),
        GameEvent::Reverted { .. } => "No match, swap reverted".to_string(),
        GameEvent::ScoreAdded { points } => format!("+{} points", points),
        GameEvent::Removed { positions } => format!("Cleared {} gems", positions.len()),
        GameEvent::Dropped { drops } => format!("{} gems fell", drops.len()),
        GameEvent::Added { positions } => format!("{} new gems", positions.len()),
        GameEvent::Shuffled => "No moves left, board shuffled".to_string(),
        GameEvent::Finished { won, moves_used, stars } => {
            if *won {
                format!(
                    "Level complete in {} moves {}",
                    moves_used,
                    render_stars(*stars)
                )
            } else {
                format!("Level failed after {} moves", moves_used)
            }
        }
    }
}

pub fn render_catalog(
    catalog: &LevelCatalog,
    statistics: &AllStatistics,
    progression: &Progression,
) -> String {
    let mut out = String::new();
    for level in catalog.levels() {
        let state = if progression.is_unlocked(level.id) {
            render_stars(statistics.best_stars(level.id))
        } else {
            "locked".to_string()
        };
        out.push_str(&format!(
            "{:>3}  {:<18} {:>2}x{:<2} {} gems  target {:>5}  par {:>2}  {}\n",
            level.id,
            level.name,
            level.grid_size,
            level.grid_size,
            level.gem_types,
            level.target_score,
            level.ideal_moves,
            state
        ));
    }
    out.push_str(&format!(
        "Played {}, won {} ({:.1}%), stars {}\n",
        statistics.total_games_played(),
        statistics.total_games_won(),
        statistics.overall_win_rate(),
        statistics.total_stars()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use swapix_common::games::match3::{record_outcome, AttemptOutcome, GemType};

    #[test]
    fn test_render_grid_with_headers_and_selection() {
        let kinds = vec![
            vec![Some(GemType::Ruby), Some(GemType::Sapphire), Some(GemType::Emerald), Some(GemType::Topaz)],
            vec![Some(GemType::Topaz), Some(GemType::Ruby), Some(GemType::Sapphire), Some(GemType::Emerald)],
            vec![Some(GemType::Ruby), Some(GemType::Sapphire), Some(GemType::Emerald), Some(GemType::Topaz)],
            vec![Some(GemType::Topaz), Some(GemType::Ruby), None, Some(GemType::Emerald)],
        ];
        let grid = Grid::from_types(&kinds, 4).unwrap();

        let rendered = render_grid(&grid, Some(Position::new(1, 1)));
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "     0  1  2  3 ");
        assert_eq!(lines[1], " 0   R  S  E  T ");
        assert_eq!(lines[2], " 1   T [R] S  E ");
        assert_eq!(lines[4], " 3   T  R  .  E ");
    }

    #[test]
    fn test_render_stars() {
        assert_eq!(render_stars(0), "-----");
        assert_eq!(render_stars(3), "***--");
        assert_eq!(render_stars(5), "*****");
    }

    #[test]
    fn test_describe_finished_event() {
        let won = GameEvent::Finished { won: true, moves_used: 12, stars: 4 };
        assert_eq!(describe_event(&won), "Level complete in 12 moves ****-");
        let lost = GameEvent::Finished { won: false, moves_used: 3, stars: 0 };
        assert_eq!(describe_event(&lost), "Level failed after 3 moves");
    }

    #[test]
    fn test_render_catalog_marks_locked_levels() {
        let catalog = LevelCatalog::built_in();
        let mut statistics = AllStatistics::default();
        let mut progression = Progression::default();
        let won = AttemptOutcome { level_id: 1, won: true, moves_used: 14, stars: 4 };
        record_outcome(&won, &mut statistics, &mut progression, catalog.levels().len());

        let rendered = render_catalog(&catalog, &statistics, &progression);
        let lines: Vec<&str> = rendered.lines().collect();

        assert!(lines[0].contains("Sunny Meadow") && lines[0].ends_with("****-"));
        assert!(lines[1].ends_with("-----"));
        assert!(lines[2].ends_with("locked"));
        assert_eq!(lines[10], "Played 1, won 1 (100.0%), stars 4");
    }
}

use std::io::{self, BufRead, Write};

use swapix_common::games::match3::{AttemptOutcome, GameStatus, Position, Session, SwapOutcome};
use swapix_common::log;

use crate::render::{describe_event, render_grid, render_status};

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Swap(Position, Position),
    Hint,
    GiveUp,
    Quit,
}

pub fn parse_command(input: &str) -> Result<Command, String> {
    let trimmed = input.trim();
    match trimmed {
        "h" => return Ok(Command::Hint),
        "g" => return Ok(Command::GiveUp),
        "q" => return Ok(Command::Quit),
        _ => {}
    }

    let numbers: Vec<usize> = trimmed
        .split_whitespace()
        .map(|part| part.parse::<usize>())
        .collect::<Result<_, _>>()
        .map_err(|_| format!("Invalid input '{}': expected numbers, 'h', 'g' or 'q'", trimmed))?;

    match numbers.as_slice() {
        [r1, c1, r2, c2] => Ok(Command::Swap(Position::new(*r1, *c1), Position::new(*r2, *c2))),
        _ => Err("Use 'r1 c1 r2 c2' to swap, 'h' for a hint, 'g' to give up, 'q' to quit".to_string()),
    }
}

fn print_events(session: &mut Session, out: &mut impl Write) -> io::Result<()> {
    for event in session.take_events() {
        writeln!(out, "  {}", describe_event(&event))?;
    }
    Ok(())
}

/// Reads commands until the level is won, abandoned or input ends.
/// Returns the outcome to record, or `None` when the player quit without finishing.
pub fn interactive(
    session: &mut Session,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> io::Result<Option<AttemptOutcome>> {
    print_events(session, out)?;

    loop {
        writeln!(out, "{}", render_status(session))?;
        write!(out, "{}", render_grid(session.grid(), session.selected()))?;

        if session.status() == GameStatus::Won {
            return Ok(session.outcome());
        }

        write!(out, "Swap (r1 c1 r2 c2), 'h' hint, 'g' give up, 'q' quit: ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(None);
        }

        match parse_command(&line) {
            Ok(Command::Quit) => {
                writeln!(out, "Thanks for playing!")?;
                return Ok(None);
            }
            Ok(Command::GiveUp) => match session.give_up() {
                Ok(outcome) => {
                    writeln!(out, "Level abandoned after {} moves", outcome.moves_used)?;
                    return Ok(Some(outcome));
                }
                Err(e) => writeln!(out, "{}", e)?,
            },
            Ok(Command::Hint) => match session.hint() {
                Some((a, b)) => writeln!(
                    out,
                    "Try swapping ({}, {}) with ({}, {})",
                    a.row, a.col, b.row, b.col
                )?,
                None => writeln!(out, "No move available")?,
            },
            Ok(Command::Swap(a, b)) => match session.swap(a, b) {
                Ok(_) => print_events(session, out)?,
                Err(e) => writeln!(out, "{}", e)?,
            },
            Err(e) => writeln!(out, "{}", e)?,
        }
    }
}

/// Plays hinted moves until the level is won or `max_moves` productive swaps were spent,
/// then gives up.
pub fn autoplay(session: &mut Session, max_moves: u32) -> Result<AttemptOutcome, String> {
    while session.moves_used() < max_moves {
        let Some((a, b)) = session.hint() else {
            break;
        };
        if let SwapOutcome::Resolved(summary) = session.swap(a, b)? {
            log!(
                "Move {}: {} steps, +{} points, score {}/{}",
                session.moves_used(),
                summary.steps,
                summary.points,
                session.score(),
                session.target_score()
            );
        }
        session.take_events();

        if let Some(outcome) = session.outcome() {
            return Ok(outcome);
        }
    }
    session.give_up()
}

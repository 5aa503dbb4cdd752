//! Color assignment rules shared by the pairing strategies.
//!
//! The constraints: no player's color balance may leave [-2, +2], and no
//! player receives the same color three games in a row. Byes carry no
//! color and do not extend a same-color run.

use tourney_core::Color;

use crate::state::TournamentPlayer;

/// Returns true if one more game with `color` would push the player past
/// a color constraint.
pub(crate) fn color_violates(p: &TournamentPlayer, color: Color) -> bool {
    if (p.color_balance() + color.balance_delta()).abs() > 2 {
        return true;
    }
    let mut recent = p.colors.iter().rev().flatten();
    matches!(
        (recent.next(), recent.next()),
        (Some(&a), Some(&b)) if a == color && b == color
    )
}

/// Returns true if giving `white` White and `black` Black keeps both
/// players within the color constraints.
pub(crate) fn orientation_legal(white: &TournamentPlayer, black: &TournamentPlayer) -> bool {
    !color_violates(white, Color::White) && !color_violates(black, Color::Black)
}

/// Returns true if at least one orientation of the pair is legal.
pub(crate) fn some_orientation_legal(a: &TournamentPlayer, b: &TournamentPlayer) -> bool {
    orientation_legal(a, b) || orientation_legal(b, a)
}

/// Decides the orientation of a finalized pairing: the more negative
/// color balance takes White; on a tie, whoever had Black more recently;
/// with no usable history, `fallback_first_white` decides. The preference
/// is flipped when it would break a constraint the other orientation
/// respects. Returns true when the first player takes White.
pub(crate) fn first_takes_white(
    a: &TournamentPlayer,
    b: &TournamentPlayer,
    fallback_first_white: bool,
) -> bool {
    let preferred = preferred_orientation(a, b, fallback_first_white);
    let (w, bl) = if preferred { (a, b) } else { (b, a) };
    if orientation_legal(w, bl) {
        preferred
    } else if orientation_legal(bl, w) {
        !preferred
    } else {
        preferred
    }
}

fn preferred_orientation(a: &TournamentPlayer, b: &TournamentPlayer, fallback: bool) -> bool {
    let (balance_a, balance_b) = (a.color_balance(), b.color_balance());
    if balance_a != balance_b {
        return balance_a < balance_b;
    }
    match (last_black_age(a), last_black_age(b)) {
        (Some(x), Some(y)) if x != y => x < y,
        (Some(_), None) => true,
        (None, Some(_)) => false,
        _ => fallback,
    }
}

/// Games since the player last held Black (0 = most recent game), byes
/// skipped.
fn last_black_age(p: &TournamentPlayer) -> Option<usize> {
    p.colors
        .iter()
        .rev()
        .flatten()
        .position(|&c| c == Color::Black)
}

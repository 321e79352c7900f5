use board::{Position, Square};
use rand::seq::IteratorRandom;
use rand::Rng;

/// Plays up to `plies` uniformly random moves from the start position,
/// passing when forced. Stops early if the game ends.
pub fn random_opening<R: Rng>(rng: &mut R, plies: usize) -> Position {
    let mut position = Position::start();

    for _ in 0..plies {
        if position.can_pass() {
            position.pass();
        }

        let Some(square) = position.moves().choose(rng) else {
            break;
        };
        play(&mut position, square);
    }

    position
}

/// Plays a move known to be legal.
pub fn play(position: &mut Position, square: Square) {
    let flips = position.flips(square);
    position.play(square, flips);
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_random_opening_plays_requested_plies() {
        let mut rng = StdRng::seed_from_u64(3);
        let position = random_opening(&mut rng, 10);

        assert_eq!(position.ply(), 10);
        assert_eq!(position.empty_count(), 50);
    }

    #[test]
    fn test_random_opening_is_reproducible() {
        let a = random_opening(&mut StdRng::seed_from_u64(11), 20);
        let b = random_opening(&mut StdRng::seed_from_u64(11), 20);
        assert_eq!(a, b);
    }
}

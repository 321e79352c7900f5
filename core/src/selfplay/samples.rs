use std::io::{self, Write};

use board::{Color, Position};
use search::SCORE_MAX;

/// A position scored during self-play, labelled with how the game ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    /// 64 square symbols a1..h8
    pub squares: String,
    pub side: Color,
    /// Search score for the side to move
    pub score: i32,
    /// Final disc difference for the side to move
    pub result: i32,
    pub game_id: usize,
}

impl Sample {
    /// Records `position` before the game result is known.
    pub fn pending(position: &Position, score: i32, game_id: usize) -> Self {
        let mut squares = position.to_board_string();
        squares.truncate(64);

        Self {
            squares,
            side: position.side(),
            score: score.clamp(-SCORE_MAX, SCORE_MAX),
            result: 0,
            game_id,
        }
    }
}

/// Final disc difference from black's side.
pub fn black_score(finished: &Position) -> i32 {
    match finished.side() {
        Color::Black => finished.final_score(),
        Color::White => -finished.final_score(),
    }
}

/// Labels every sample of a finished game with its final disc difference.
pub fn label_game(samples: &mut [Sample], finished: &Position) {
    let black = black_score(finished);

    for sample in samples {
        sample.result = match sample.side {
            Color::Black => black,
            Color::White => -black,
        };
    }
}

pub fn write_csv<W: Write>(samples: &[Sample], writer: &mut W) -> io::Result<()> {
    writeln!(writer, "board,side,score,result,game_id")?;
    for sample in samples {
        writeln!(
            writer,
            "{},{},{},{},{}",
            sample.squares,
            sample.side.symbol(),
            sample.score,
            sample.result,
            sample.game_id
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use board::record;

    use super::*;

    #[test]
    fn test_pending_sample_splits_side() {
        let position = record::replay("f5").unwrap();
        let sample = Sample::pending(&position, 99, 3);

        assert_eq!(sample.squares.len(), 64);
        assert_eq!(sample.side, Color::White);
        assert_eq!(sample.score, SCORE_MAX);
        assert_eq!(
            format!("{} {}", sample.squares, sample.side.symbol()),
            position.to_board_string()
        );
    }

    #[test]
    fn test_label_game_uses_each_sides_view() {
        // Black owns every disc
        let finished: Position = format!("{} O", "X".repeat(64)).parse().unwrap();
        let start = Position::start();
        let after_f5 = record::replay("f5").unwrap();

        let mut samples = vec![
            Sample::pending(&start, 0, 0),
            Sample::pending(&after_f5, 0, 0),
        ];
        label_game(&mut samples, &finished);

        assert_eq!(samples[0].result, 64);
        assert_eq!(samples[1].result, -64);
    }

    #[test]
    fn test_write_csv() {
        let position = Position::start();
        let mut sample = Sample::pending(&position, -3, 7);
        sample.result = 10;

        let mut out = Vec::new();
        write_csv(&[sample], &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("board,side,score,result,game_id"));
        assert_eq!(
            lines.next(),
            Some(format!("{},X,-3,10,7", &position.to_board_string()[..64]).as_str())
        );
        assert_eq!(lines.next(), None);
    }
}

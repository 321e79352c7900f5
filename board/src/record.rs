//! Game records in the compact `f5d6c3...` notation.

use crate::{BoardError, Position, Square};

/// Splits a record into squares. Whitespace between moves is ignored.
pub fn parse_record(record: &str) -> Result<Vec<Square>, BoardError> {
    let compact: String = record.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() % 2 != 0 || !compact.is_ascii() {
        return Err(BoardError::InvalidRecord {
            position: compact.len() / 2 + 1,
            reason: "truncated move".to_string(),
        });
    }

    compact
        .as_bytes()
        .chunks(2)
        .enumerate()
        .map(|(index, chunk)| {
            let text = std::str::from_utf8(chunk).unwrap_or_default();
            text.parse().map_err(|_| BoardError::InvalidRecord {
                position: index + 1,
                reason: format!("`{}` is not a square", text),
            })
        })
        .collect()
}

/// Replays a record from the start position, passing whenever the side to move has no move.
pub fn replay(record: &str) -> Result<Position, BoardError> {
    let moves = parse_record(record)?;
    let mut position = Position::start();

    for (index, square) in moves.into_iter().enumerate() {
        if position.can_pass() {
            position.pass();
        }
        position
            .apply(square)
            .map_err(|_| BoardError::InvalidRecord {
                position: index + 1,
                reason: format!("{} is illegal", square),
            })?;
    }

    if position.can_pass() {
        position.pass();
    }

    Ok(position)
}

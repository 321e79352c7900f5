use board::{legal_moves, CORNERS};

use super::objective::Midgame;
use super::Engine;
use crate::move_ordering::{Hint, MoveList, SQUARE_VALUE, WIPEOUT_SCORE};
use crate::{SearchError, SCORE_INF};

// Shallow probes only need to be accurate near alpha
const ORDERING_MARGIN: i32 = 8;
// Weight of the shallow probe against the static square value
const PROBE_WEIGHT: i32 = 16;

impl Engine {
    /// Scores every move of `list` for `next_best`.
    ///
    /// A wipeout beats everything, then the cached best and second moves.
    /// Other moves get the static square value plus a shallow unordered
    /// search of the reply, minus a penalty for the replies they allow.
    pub(super) fn evaluate_moves(
        &mut self,
        list: &MoveList,
        alpha: i32,
        hint: Hint,
        depth: u8,
    ) -> Result<(), SearchError> {
        let opponent = self.position.opponent();
        let lookahead = (depth / 4).min(self.config.lookahead_depth.value);
        let mobility_weight = self.config.mobility_weight.value;
        let corner_weight = self.config.corner_mobility_weight.value;

        let mut cursor = list.head();
        while let Some(handle) = cursor {
            let mv = list.get(&self.pool, handle)?;
            cursor = mv.next();

            let score = if mv.flips == opponent {
                WIPEOUT_SCORE
            } else if let Some(bonus) = hint.bonus(mv.square) {
                bonus
            } else {
                self.make(mv.square, mv.flips);
                let replies = legal_moves(self.position.mover(), self.position.opponent());
                let probe =
                    -self.deep::<Midgame>(lookahead, -SCORE_INF, ORDERING_MARGIN - alpha, false);
                self.unmake(mv.square, mv.flips);

                SQUARE_VALUE[mv.square.index()] + PROBE_WEIGHT * probe
                    - mobility_weight * replies.count_ones() as i32
                    - corner_weight * (replies & CORNERS).count_ones() as i32
            };

            list.set_score(&mut self.pool, handle, score)?;
        }

        Ok(())
    }
}

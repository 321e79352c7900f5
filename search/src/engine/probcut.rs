use super::objective::{Midgame, Objective};
use super::Engine;
use crate::pruning::{can_probcut, provable, MpcModel, MpcParams};
use crate::SearchError;

impl Engine {
    /// Multi-ProbCut for a null-window node at `alpha..alpha + 1`.
    ///
    /// Returns `alpha + 1` or `alpha` when a shallow search predicts the
    /// deep result falls outside the window with enough confidence. The
    /// prediction is never stored in the tables.
    pub(super) fn probcut<O: Objective>(
        &mut self,
        depth: u8,
        alpha: i32,
    ) -> Result<Option<i32>, SearchError> {
        let config = &self.config;
        if O::EXACT
            || !config.use_mpc.value
            || !can_probcut(
                depth,
                config.mpc_min_depth.value,
                config.mpc_max_depth.value,
                self.distance_from_root(),
                config.mpc_root_distance.value,
                self.mpc_nesting,
                config.mpc_max_nesting.value,
            )
        {
            return Ok(None);
        }

        let params = self.mpc.params(self.position.empty_count(), depth);
        let threshold = config.mpc_threshold.value as f32 / 100.0;
        let shallow = MpcModel::shallow_depth(depth);

        self.mpc_nesting += 1;
        let result = self.probcut_verify(params, threshold, shallow, alpha);
        self.mpc_nesting -= 1;

        let cut = result?;
        if cut.is_some() {
            self.stats.mpc_cuts += 1;
        }
        Ok(cut)
    }

    fn probcut_verify(
        &mut self,
        params: MpcParams,
        threshold: f32,
        shallow: u8,
        alpha: i32,
    ) -> Result<Option<i32>, SearchError> {
        let beta = alpha + 1;

        let high = params.high_cut(beta, threshold);
        if provable(high) && self.nws::<Midgame>(shallow, high - 1, false)? >= high {
            return Ok(Some(beta));
        }

        let low = params.low_cut(alpha, threshold);
        if provable(low) && self.nws::<Midgame>(shallow, low, false)? <= low {
            return Ok(Some(alpha));
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::super::objective::{Endgame, Midgame};
    use super::super::tests::{engine_with, position_with, test_config};

    #[test]
    fn test_disabled_near_root_and_in_endgame() {
        let mut engine = engine_with(test_config());
        let position = position_with(40);
        engine.init_search(&position);

        // At the root the distance gate holds
        assert_eq!(engine.probcut::<Midgame>(8, 0).unwrap(), None);
        assert_eq!(engine.probcut::<Endgame>(8, 0).unwrap(), None);
        assert_eq!(engine.stats.mpc_cuts, 0);
    }

    #[test]
    fn test_cuts_hopeless_window() {
        let mut config = test_config();
        config.mpc_root_distance.value = 0;
        let mut engine = engine_with(config);
        let position = position_with(40);
        engine.init_search(&position);

        // The evaluator is clamped to +-64, so a window at the edge is
        // decided by any shallow search
        assert_eq!(engine.probcut::<Midgame>(8, 64).unwrap(), Some(64));
        assert_eq!(engine.stats.mpc_cuts, 1);
        assert_eq!(engine.mpc_nesting, 0);
        assert_eq!(*engine.position(), position);
    }
}

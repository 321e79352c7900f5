use board::{flip_mask, legal_moves, Square, Squares};

use crate::arena::{Arena, Handle};
use crate::SearchError;

/// A candidate move and its ordering score, linked into one node's list.
#[derive(Clone, Copy, Debug)]
pub struct Move {
    pub square: Square,
    pub flips: u64,
    pub score: i32,
    next: Option<Handle>,
}

impl Move {
    pub fn next(&self) -> Option<Handle> {
        self.next
    }
}

#[inline(always)]
fn node(pool: &Arena<Move>, handle: Handle) -> Result<&Move, SearchError> {
    pool.get(handle).ok_or(SearchError::StaleHandle(handle))
}

#[inline(always)]
fn node_mut(pool: &mut Arena<Move>, handle: Handle) -> Result<&mut Move, SearchError> {
    pool.get_mut(handle).ok_or(SearchError::StaleHandle(handle))
}

/// Singly linked move list living in a shared pool.
///
/// `next_best` does one step of selection sort, so a node that cuts off
/// after a few moves never pays for ordering the rest.
#[derive(Debug, Default)]
pub struct MoveList {
    head: Option<Handle>,
    len: usize,
}

impl MoveList {
    /// Builds the list of legal moves in square order, all scored 0.
    pub fn new(pool: &mut Arena<Move>, mover: u64, opponent: u64) -> Result<Self, SearchError> {
        let mut list = Self::default();
        let mut tail: Option<Handle> = None;

        for square in Squares(legal_moves(mover, opponent)) {
            let flips = flip_mask(mover, opponent, square);
            debug_assert!(flips != 0);

            let handle = pool.insert(Move {
                square,
                flips,
                score: 0,
                next: None,
            })?;

            match tail {
                Some(t) => node_mut(pool, t)?.next = Some(handle),
                None => list.head = Some(handle),
            }
            tail = Some(handle);
            list.len += 1;
        }

        Ok(list)
    }

    pub fn head(&self) -> Option<Handle> {
        self.head
    }

    pub fn get(&self, pool: &Arena<Move>, handle: Handle) -> Result<Move, SearchError> {
        node(pool, handle).copied()
    }

    pub fn set_score(
        &self,
        pool: &mut Arena<Move>,
        handle: Handle,
        score: i32,
    ) -> Result<(), SearchError> {
        node_mut(pool, handle)?.score = score;
        Ok(())
    }

    /// Handles in current list order.
    pub fn handles(&self, pool: &Arena<Move>) -> Result<Vec<Handle>, SearchError> {
        let mut handles = Vec::with_capacity(self.len);
        let mut cursor = self.head;
        while let Some(handle) = cursor {
            handles.push(handle);
            cursor = node(pool, handle)?.next;
        }
        Ok(handles)
    }

    /// Moves the best-scored move after `previous` (or the whole list when
    /// `previous` is `None`) right behind `previous` and returns it.
    /// Equal scores keep their current order.
    pub fn next_best(
        &mut self,
        pool: &mut Arena<Move>,
        previous: Option<Handle>,
    ) -> Result<Option<Handle>, SearchError> {
        let first = match previous {
            Some(p) => node(pool, p)?.next,
            None => self.head,
        };
        let Some(first) = first else {
            return Ok(None);
        };

        let mut best = first;
        let mut best_score = node(pool, first)?.score;
        let mut before_best: Option<Handle> = None;

        let mut before = first;
        let mut cursor = node(pool, first)?.next;
        while let Some(handle) = cursor {
            let mv = node(pool, handle)?;
            if mv.score > best_score {
                best = handle;
                best_score = mv.score;
                before_best = Some(before);
            }
            before = handle;
            cursor = mv.next;
        }

        if let Some(before_best) = before_best {
            let after_best = node(pool, best)?.next;
            node_mut(pool, before_best)?.next = after_best;
            node_mut(pool, best)?.next = Some(first);
            match previous {
                Some(p) => node_mut(pool, p)?.next = Some(best),
                None => self.head = Some(best),
            }
        }

        Ok(Some(best))
    }

    /// Full selection sort, best first.
    pub fn sort(&mut self, pool: &mut Arena<Move>) -> Result<(), SearchError> {
        let mut previous = None;
        while let Some(handle) = self.next_best(pool, previous)? {
            previous = Some(handle);
        }
        Ok(())
    }

    /// Returns every node to the pool.
    pub fn release(self, pool: &mut Arena<Move>) {
        let mut cursor = self.head;
        while let Some(handle) = cursor {
            cursor = pool.remove(handle).and_then(|mv| mv.next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board::Position;

    fn scored_list(pool: &mut Arena<Move>, scores: &[i32]) -> MoveList {
        let position = Position::start();
        let list = MoveList::new(pool, position.mover(), position.opponent()).unwrap();
        let handles = list.handles(pool).unwrap();
        for (handle, score) in handles.iter().zip(scores) {
            list.set_score(pool, *handle, *score).unwrap();
        }
        list
    }

    fn scores(list: &MoveList, pool: &Arena<Move>) -> Vec<i32> {
        list.handles(pool)
            .unwrap()
            .iter()
            .map(|h| list.get(pool, *h).unwrap().score)
            .collect()
    }

    #[test]
    fn test_start_list() {
        let mut pool = Arena::with_capacity("moves", 8).unwrap();
        let position = Position::start();
        let list = MoveList::new(&mut pool, position.mover(), position.opponent()).unwrap();
        assert_eq!(list.handles(&pool).unwrap().len(), 4);

        let squares: Vec<String> = list
            .handles(&pool)
            .unwrap()
            .iter()
            .map(|h| list.get(&pool, *h).unwrap().square.to_string())
            .collect();
        assert_eq!(squares, ["d3", "c4", "f5", "e6"]);
    }

    #[test]
    fn test_next_best_promotes_in_place() {
        let mut pool = Arena::with_capacity("moves", 8).unwrap();
        let mut list = scored_list(&mut pool, &[1, 7, 3, 5]);

        let first = list.next_best(&mut pool, None).unwrap().unwrap();
        assert_eq!(list.get(&pool, first).unwrap().score, 7);
        assert_eq!(scores(&list, &pool), [7, 1, 3, 5]);

        let second = list.next_best(&mut pool, Some(first)).unwrap().unwrap();
        assert_eq!(list.get(&pool, second).unwrap().score, 5);
        assert_eq!(scores(&list, &pool), [7, 5, 1, 3]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut pool = Arena::with_capacity("moves", 8).unwrap();
        let mut list = scored_list(&mut pool, &[2, 9, 2, 9]);
        let before = list.handles(&pool).unwrap();

        list.sort(&mut pool).unwrap();
        let after = list.handles(&pool).unwrap();
        assert_eq!(after, [before[1], before[3], before[0], before[2]]);
    }

    #[test]
    fn test_next_best_exhausts() {
        let mut pool = Arena::with_capacity("moves", 8).unwrap();
        let mut list = scored_list(&mut pool, &[0, 0, 0, 0]);

        let mut previous = None;
        let mut seen = 0;
        while let Some(handle) = list.next_best(&mut pool, previous).unwrap() {
            previous = Some(handle);
            seen += 1;
        }
        assert_eq!(seen, 4);
    }

    #[test]
    fn test_release_returns_nodes() {
        let mut pool = Arena::with_capacity("moves", 8).unwrap();
        let list = scored_list(&mut pool, &[1, 2, 3, 4]);
        let handle = list.head().unwrap();

        list.release(&mut pool);
        assert!(pool.is_empty());

        let mut list = MoveList::default();
        assert!(matches!(
            list.next_best(&mut pool, Some(handle)),
            Err(SearchError::StaleHandle(_))
        ));
    }
}

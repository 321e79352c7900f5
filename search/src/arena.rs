use crate::error::SearchError;

/// Index into an `Arena` tagged with the slot generation it was issued for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot pool with a free list. Reusing a slot bumps its generation, so an
/// outdated handle is detected instead of aliasing the new occupant.
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
    name: &'static str,
}

impl<T> Arena<T> {
    pub fn with_capacity(name: &'static str, capacity: usize) -> Result<Self, SearchError> {
        let mut arena = Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            name,
        };
        arena.reserve(capacity)?;
        Ok(arena)
    }

    fn reserve(&mut self, additional: usize) -> Result<(), SearchError> {
        let out_of_memory = |_| SearchError::OutOfMemory {
            pool: self.name,
            requested: additional,
        };
        self.slots.try_reserve(additional).map_err(out_of_memory)?;

        // The free list must hold every slot, so `remove` never allocates.
        let needed = self.slots.capacity().saturating_sub(self.free.len());
        self.free.try_reserve(needed).map_err(out_of_memory)
    }

    pub fn insert(&mut self, value: T) -> Result<Handle, SearchError> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.value.is_none());
            slot.value = Some(value);
            self.live += 1;
            return Ok(Handle {
                index,
                generation: slot.generation,
            });
        }

        if self.slots.len() == self.slots.capacity() {
            self.reserve(self.slots.len().max(16))?;
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        self.live += 1;
        Ok(Handle {
            index,
            generation: 0,
        })
    }

    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }

        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        Some(value)
    }

    #[inline(always)]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    #[inline(always)]
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Frees every slot. All outstanding handles become stale.
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(index as u32);
        }
        self.live = 0;
    }
}

use crate::types::RawHandle;

/// Hands out handle indices, reusing freed ones before growing.
pub(crate) struct HandleAllocator<T> {
    max_allocated: usize,
    freelist: Vec<usize>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> HandleAllocator<T> {
    pub fn new() -> Self {
        Self {
            max_allocated: 0,
            freelist: Vec::new(),
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn allocate(&mut self) -> RawHandle<T> {
        let idx = self.freelist.pop().unwrap_or_else(|| {
            let idx = self.max_allocated;
            self.max_allocated += 1;
            idx
        });

        RawHandle::new(idx)
    }

    pub fn deallocate(&mut self, handle: RawHandle<T>) {
        debug_assert!(handle.idx < self.max_allocated);
        self.freelist.push(handle.idx);
    }
}

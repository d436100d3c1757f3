/// Previous and current value of a polled quantity.
///
/// Both slots start at `T::default()`. Only [`update`](Self::update) changes
/// them; there is no internal synchronization.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ValueSnapshot<T> {
    previous: T,
    current: T,
}

impl<T: Copy + Default> ValueSnapshot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift `current` into `previous` and store `value`
    pub fn update(&mut self, value: T) {
        self.previous = self.current;
        self.current = value;
    }

    pub fn previous(&self) -> T {
        self.previous
    }

    pub fn current(&self) -> T {
        self.current
    }
}

impl<T: Copy + Default + PartialEq> ValueSnapshot<T> {
    /// Whether the last update changed the value
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Push-style notification sink the interpreter calls synchronously after
/// every state mutation, so a front end can mirror the machine without
/// polling. Callbacks run inline with the mutation and must not re-enter
/// the interpreter.
///
/// Every method has a no-op default, so an implementation only overrides
/// the state it cares about.
pub trait Observer {
    fn register_changed(&mut self, index: u8, value: u8) {
        let _ = (index, value);
    }

    fn program_counter_changed(&mut self, value: u16) {
        let _ = value;
    }

    fn stack_pointer_changed(&mut self, value: u8) {
        let _ = value;
    }

    fn address_register_changed(&mut self, value: u16) {
        let _ = value;
    }

    fn delay_timer_changed(&mut self, value: u8) {
        let _ = value;
    }

    fn sound_timer_changed(&mut self, value: u8) {
        let _ = value;
    }

    /// Full snapshot of the call stack slots, the occupied-slot count and
    /// the capacity, after any push or pop.
    fn stack_changed(&mut self, stack: &[u16], pointer: u8, capacity: usize) {
        let _ = (stack, pointer, capacity);
    }

    /// Bulk signal that memory was written; carries no payload, the
    /// observer re-reads whatever it cached.
    fn memory_changed(&mut self) {}

    /// The display buffer changed and should be rasterized again.
    fn display_refresh_requested(&mut self) {}
}

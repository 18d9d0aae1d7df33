use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::consts;
use crate::core::display::Display;
use crate::core::keyboard::Keyboard;
use crate::core::memory::Memory;
use crate::core::observer::Observer;
use crate::core::opcode::{self, Op};
use crate::core::rom::Rom;
use crate::utils;

/// Recoverable fault raised by a single cycle. Nothing here aborts the
/// machine; the interpreter logs the fault and the next cycle proceeds as
/// usual.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Fault {
    #[error("return with empty call stack at pc {pc:#06X}")]
    StackUnderflow { pc: u16 },
    #[error("call with full call stack (capacity {capacity}) at pc {pc:#06X}")]
    StackOverflow { capacity: usize, pc: u16 },
    #[error("unrecognized instruction {word:#06X} at pc {pc:#06X}")]
    UnrecognizedInstruction { word: u16, pc: u16 },
}

/// Behavior toggles for instructions whose semantics differ between
/// hardware generations. Defaults match the machine modelled here: shifts
/// operate on Vx in place, and adding to the address register sets VF on
/// 12-bit overflow but never clears it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Quirks {
    /// Shift instructions read Vy and store the shifted value into Vx.
    pub shift_source_y: bool,
    /// Adding to the address register clears VF when there is no overflow.
    pub index_add_clears_flag: bool,
}

/// The interpreter core: register file, program counter, bounded call
/// stack, address register and the two countdown timers, plus shared
/// handles to memory, display and keyboard. One call to [`cycle`] executes
/// exactly one instruction; [`cycle_delay`] and [`cycle_sound`] are driven
/// separately at the caller's refresh cadence.
///
/// [`cycle`]: Interpreter::cycle
/// [`cycle_delay`]: Interpreter::cycle_delay
/// [`cycle_sound`]: Interpreter::cycle_sound
pub struct Interpreter {
    registers: [u8; consts::REG_COUNT],
    address_register: u16,
    pc: u16,
    stack: Box<[u16]>,
    stack_pointer: u8,
    delay_timer: u8,
    sound_timer: u8,
    memory: Rc<RefCell<Memory>>,
    display: Rc<RefCell<Display>>,
    keyboard: Rc<RefCell<Keyboard>>,
    observer: Option<Rc<RefCell<dyn Observer>>>,
    operation_table: HashMap<u16, Op>,
    rng: StdRng,
    quirks: Quirks,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_components(
            Rc::new(RefCell::new(Memory::default())),
            Rc::new(RefCell::new(Display::default())),
            Rc::new(RefCell::new(Keyboard::default())),
        )
    }

    pub fn with_components(
        memory: Rc<RefCell<Memory>>,
        display: Rc<RefCell<Display>>,
        keyboard: Rc<RefCell<Keyboard>>,
    ) -> Self {
        Self::with_stack_capacity(memory, display, keyboard, consts::STACK_SIZE)
    }

    /// Construct with a non-default call stack capacity. The stack pointer
    /// is a byte, as on the original hardware, so capacities above 255 are
    /// capped.
    pub fn with_stack_capacity(
        memory: Rc<RefCell<Memory>>,
        display: Rc<RefCell<Display>>,
        keyboard: Rc<RefCell<Keyboard>>,
        capacity: usize,
    ) -> Self {
        let capacity = capacity.min(u8::MAX as usize);
        Interpreter {
            registers: [0; consts::REG_COUNT],
            address_register: 0,
            pc: consts::PROG_OFFSET as u16,
            stack: vec![0; capacity].into_boxed_slice(),
            stack_pointer: 0,
            delay_timer: 0,
            sound_timer: 0,
            memory,
            display,
            keyboard,
            observer: None,
            operation_table: opcode::operation_table(),
            rng: StdRng::from_entropy(),
            quirks: Quirks::default(),
        }
    }

    /// Attach the notification sink. The observer immediately receives a
    /// stack snapshot and a memory-changed signal so it starts in sync.
    pub fn attach_observer(&mut self, observer: Rc<RefCell<dyn Observer>>) {
        self.observer = Some(observer);
        self.notify_stack();
        self.notify(|o| o.memory_changed());
    }

    pub fn set_quirks(&mut self, quirks: Quirks) {
        self.quirks = quirks;
    }

    /// Replace the random source with a seeded generator, for reproducible
    /// behavior of the random instruction.
    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Rebuild the operation table. Idempotent; the table is otherwise
    /// immutable after construction.
    pub fn rebuild_operation_table(&mut self) {
        self.operation_table = opcode::operation_table();
    }

    /// Write a program image into memory at the load origin.
    pub fn load_program(&mut self, rom: &Rom) {
        self.memory.borrow_mut().load_image(rom.bytes());
        self.notify(|o| o.memory_changed());
    }

    /// Zero every register, timer, the stack pointer and the address
    /// register, and point the program counter back at the load origin.
    /// Every reset value is pushed to the observer.
    pub fn reset(&mut self) {
        self.registers = [0; consts::REG_COUNT];
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.stack_pointer = 0;
        self.address_register = 0;
        self.pc = consts::PROG_OFFSET as u16;

        for index in 0..consts::REG_COUNT {
            self.notify_register(index);
        }
        self.notify(|o| o.delay_timer_changed(0));
        self.notify(|o| o.sound_timer_changed(0));
        self.notify_stack_pointer();
        self.notify_address_register();
        self.notify_program_counter();
        self.notify_stack();
    }

    /// Execute one fetch-decode-execute cycle: read the big-endian word at
    /// the program counter, advance past it, then dispatch through the
    /// operation table. Unrecognized words are reported and skipped.
    pub fn cycle(&mut self) -> Option<Fault> {
        let word = {
            let memory = self.memory.borrow();
            ((memory.read_byte(self.pc) as u16) << 8)
                | memory.read_byte(self.pc.wrapping_add(1)) as u16
        };
        self.pc = self.pc.wrapping_add(consts::OP_CODE_BYTES as u16);
        self.notify_program_counter();

        let (addr, x, y, value) = utils::split_fields(word);

        let operation = match self.operation_table.get(&opcode::refine_key(word)) {
            Some(&operation) => operation,
            None => {
                let fault = Fault::UnrecognizedInstruction { word, pc: self.pc };
                warn!("{fault}");
                return Some(fault);
            }
        };

        let fault = match operation {
            Op::ClearScreen => self.op_clear_screen(),
            Op::Return => self.op_return(),
            Op::SystemCall => self.op_system_call(addr),
            Op::Jump => self.op_jump(addr),
            Op::Call => self.op_call(addr),
            Op::SkipEqualValue => self.op_skip_equal_value(x, value),
            Op::SkipNotEqualValue => self.op_skip_not_equal_value(x, value),
            Op::SkipEqualRegister => self.op_skip_equal_register(x, y),
            Op::AssignValue => self.op_assign_value(x, value),
            Op::AddValue => self.op_add_value(x, value),
            Op::AssignRegister => self.op_assign_register(x, y),
            Op::Or => self.op_or(x, y),
            Op::And => self.op_and(x, y),
            Op::Xor => self.op_xor(x, y),
            Op::AddRegister => self.op_add_register(x, y),
            Op::SubtractRegister => self.op_subtract_register(x, y),
            Op::ShiftRight => self.op_shift_right(x, y),
            Op::SubtractNegative => self.op_subtract_negative(x, y),
            Op::ShiftLeft => self.op_shift_left(x, y),
            Op::SkipNotEqualRegister => self.op_skip_not_equal_register(x, y),
            Op::SetAddress => self.op_set_address(addr),
            Op::JumpOffset => self.op_jump_offset(addr),
            Op::Random => self.op_random(x, value),
            Op::Draw => self.op_draw(x, y, value),
            Op::SkipKeyPressed => self.op_skip_key_pressed(x),
            Op::SkipKeyNotPressed => self.op_skip_key_not_pressed(x),
            Op::GetDelayTimer => self.op_get_delay_timer(x),
            Op::GetKey => self.op_get_key(x),
            Op::SetDelayTimer => self.op_set_delay_timer(x),
            Op::SetSoundTimer => self.op_set_sound_timer(x),
            Op::AddAddress => self.op_add_address(x),
            Op::SetAddressSprite => self.op_set_address_sprite(x),
            Op::StoreBcd => self.op_store_bcd(x),
            Op::DumpRegisters => self.op_dump_registers(x),
            Op::LoadRegisters => self.op_load_registers(x),
        };

        if let Some(fault) = &fault {
            warn!("{fault}");
        }
        fault
    }

    /// Decrement the delay timer by one if it is running. Driven by the
    /// external cadence, not by instruction cycles.
    pub fn cycle_delay(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
            let value = self.delay_timer;
            self.notify(|o| o.delay_timer_changed(value));
        }
    }

    /// Decrement the sound timer by one if it is running.
    pub fn cycle_sound(&mut self) {
        if self.sound_timer > 0 {
            self.sound_timer -= 1;
            let value = self.sound_timer;
            self.notify(|o| o.sound_timer_changed(value));
        }
    }

    pub fn register(&self, index: u8) -> u8 {
        self.registers[(index & 0x0F) as usize]
    }

    pub fn address_register(&self) -> u16 {
        self.address_register
    }

    pub fn program_counter(&self) -> u16 {
        self.pc
    }

    pub fn stack_pointer(&self) -> u8 {
        self.stack_pointer
    }

    pub fn stack_capacity(&self) -> usize {
        self.stack.len()
    }

    // ---- observer plumbing ----

    fn notify<F>(&self, f: F)
    where
        F: FnOnce(&mut dyn Observer),
    {
        if let Some(observer) = &self.observer {
            f(&mut *observer.borrow_mut());
        }
    }

    fn notify_register(&self, index: usize) {
        let value = self.registers[index];
        self.notify(|o| o.register_changed(index as u8, value));
    }

    fn notify_program_counter(&self) {
        let value = self.pc;
        self.notify(|o| o.program_counter_changed(value));
    }

    fn notify_stack_pointer(&self) {
        let value = self.stack_pointer;
        self.notify(|o| o.stack_pointer_changed(value));
    }

    fn notify_address_register(&self) {
        let value = self.address_register;
        self.notify(|o| o.address_register_changed(value));
    }

    fn notify_stack(&self) {
        let pointer = self.stack_pointer;
        let capacity = self.stack.len();
        self.notify(|o| o.stack_changed(&self.stack, pointer, capacity));
    }

    // ---- instruction handlers ----

    fn op_clear_screen(&mut self) -> Option<Fault> {
        self.display.borrow_mut().clear();
        self.notify(|o| o.display_refresh_requested());
        None
    }

    fn op_return(&mut self) -> Option<Fault> {
        if self.stack_pointer == 0 {
            return Some(Fault::StackUnderflow { pc: self.pc });
        }
        self.stack_pointer -= 1;
        self.pc = self.stack[self.stack_pointer as usize];
        self.notify_stack();
        self.notify_stack_pointer();
        self.notify_program_counter();
        None
    }

    fn op_system_call(&mut self, addr: u16) -> Option<Fault> {
        // Machine-language routine call on the original hardware; ignored.
        debug!(
            "system call to {addr:#05X} ignored at pc {:#06X}",
            self.pc.wrapping_sub(consts::OP_CODE_BYTES as u16)
        );
        None
    }

    fn op_jump(&mut self, addr: u16) -> Option<Fault> {
        self.pc = addr;
        self.notify_program_counter();
        None
    }

    fn op_call(&mut self, addr: u16) -> Option<Fault> {
        if self.stack_pointer as usize == self.stack.len() {
            return Some(Fault::StackOverflow {
                capacity: self.stack.len(),
                pc: self.pc,
            });
        }
        self.stack[self.stack_pointer as usize] = self.pc;
        self.stack_pointer += 1;
        self.pc = addr;
        self.notify_stack();
        self.notify_stack_pointer();
        self.notify_program_counter();
        None
    }

    fn skip(&mut self) {
        self.pc = self.pc.wrapping_add(consts::OP_CODE_BYTES as u16);
        self.notify_program_counter();
    }

    fn op_skip_equal_value(&mut self, x: u8, value: u8) -> Option<Fault> {
        if self.registers[x as usize] == value {
            self.skip();
        }
        None
    }

    fn op_skip_not_equal_value(&mut self, x: u8, value: u8) -> Option<Fault> {
        if self.registers[x as usize] != value {
            self.skip();
        }
        None
    }

    fn op_skip_equal_register(&mut self, x: u8, y: u8) -> Option<Fault> {
        if self.registers[x as usize] == self.registers[y as usize] {
            self.skip();
        }
        None
    }

    fn op_skip_not_equal_register(&mut self, x: u8, y: u8) -> Option<Fault> {
        if self.registers[x as usize] != self.registers[y as usize] {
            self.skip();
        }
        None
    }

    fn op_assign_value(&mut self, x: u8, value: u8) -> Option<Fault> {
        self.registers[x as usize] = value;
        self.notify_register(x as usize);
        None
    }

    fn op_add_value(&mut self, x: u8, value: u8) -> Option<Fault> {
        // No carry flag for the immediate form.
        self.registers[x as usize] = self.registers[x as usize].wrapping_add(value);
        self.notify_register(x as usize);
        None
    }

    fn op_assign_register(&mut self, x: u8, y: u8) -> Option<Fault> {
        self.registers[x as usize] = self.registers[y as usize];
        self.notify_register(x as usize);
        None
    }

    fn op_or(&mut self, x: u8, y: u8) -> Option<Fault> {
        self.registers[x as usize] |= self.registers[y as usize];
        self.notify_register(x as usize);
        None
    }

    fn op_and(&mut self, x: u8, y: u8) -> Option<Fault> {
        self.registers[x as usize] &= self.registers[y as usize];
        self.notify_register(x as usize);
        None
    }

    fn op_xor(&mut self, x: u8, y: u8) -> Option<Fault> {
        self.registers[x as usize] ^= self.registers[y as usize];
        self.notify_register(x as usize);
        None
    }

    fn op_add_register(&mut self, x: u8, y: u8) -> Option<Fault> {
        // Carry comes from the pre-truncation sum.
        let total = self.registers[x as usize] as u16 + self.registers[y as usize] as u16;
        self.registers[consts::FLAG_REGISTER] = (total > 0xFF) as u8;
        self.registers[x as usize] = (total & 0x00FF) as u8;
        self.notify_register(x as usize);
        self.notify_register(consts::FLAG_REGISTER);
        None
    }

    fn op_subtract_register(&mut self, x: u8, y: u8) -> Option<Fault> {
        let minuend = self.registers[x as usize];
        let subtrahend = self.registers[y as usize];
        // VF is the NOT-borrow bit
        self.registers[consts::FLAG_REGISTER] = (minuend >= subtrahend) as u8;
        self.registers[x as usize] = minuend.wrapping_sub(subtrahend);
        self.notify_register(x as usize);
        self.notify_register(consts::FLAG_REGISTER);
        None
    }

    fn op_subtract_negative(&mut self, x: u8, y: u8) -> Option<Fault> {
        let minuend = self.registers[y as usize];
        let subtrahend = self.registers[x as usize];
        self.registers[consts::FLAG_REGISTER] = (minuend >= subtrahend) as u8;
        self.registers[x as usize] = minuend.wrapping_sub(subtrahend);
        self.notify_register(x as usize);
        self.notify_register(consts::FLAG_REGISTER);
        None
    }

    fn op_shift_right(&mut self, x: u8, y: u8) -> Option<Fault> {
        let source = if self.quirks.shift_source_y { y } else { x };
        let value = self.registers[source as usize];
        self.registers[consts::FLAG_REGISTER] = value & 0x01;
        self.registers[x as usize] = (value >> 1) & 0x7F;
        self.notify_register(x as usize);
        self.notify_register(consts::FLAG_REGISTER);
        None
    }

    fn op_shift_left(&mut self, x: u8, y: u8) -> Option<Fault> {
        let source = if self.quirks.shift_source_y { y } else { x };
        let value = self.registers[source as usize];
        self.registers[consts::FLAG_REGISTER] = (value & 0x80) >> 7;
        self.registers[x as usize] = (value << 1) & 0xFE;
        self.notify_register(x as usize);
        self.notify_register(consts::FLAG_REGISTER);
        None
    }

    fn op_set_address(&mut self, addr: u16) -> Option<Fault> {
        self.address_register = addr;
        self.notify_address_register();
        None
    }

    fn op_jump_offset(&mut self, addr: u16) -> Option<Fault> {
        self.pc = addr.wrapping_add(self.registers[0] as u16);
        self.notify_program_counter();
        None
    }

    fn op_random(&mut self, x: u8, value: u8) -> Option<Fault> {
        let byte: u8 = self.rng.gen();
        self.registers[x as usize] = byte & value;
        self.notify_register(x as usize);
        None
    }

    fn op_draw(&mut self, x: u8, y: u8, value: u8) -> Option<Fault> {
        let n_rows = value & 0x0F;
        let x_coord = self.registers[x as usize] % consts::DISPL_WIDTH as u8;
        let y_coord = self.registers[y as usize] % consts::DISPL_HEIGHT as u8;

        let mut collision = false;
        {
            let memory = self.memory.borrow();
            let mut display = self.display.borrow_mut();
            for i in 0..n_rows {
                let bits = memory.read_byte(self.address_register.wrapping_add(i as u16));
                // Draw before OR-ing so an earlier collision cannot
                // short-circuit the remaining rows.
                let row_hit = display.draw_row(x_coord, y_coord + i, bits);
                collision = row_hit || collision;
            }
        }
        self.registers[consts::FLAG_REGISTER] = collision as u8;
        self.notify(|o| o.display_refresh_requested());
        self.notify_register(consts::FLAG_REGISTER);
        None
    }

    fn op_skip_key_pressed(&mut self, x: u8) -> Option<Fault> {
        let pressed = self.keyboard.borrow().is_pressed(self.registers[x as usize]);
        if pressed {
            self.skip();
        }
        None
    }

    fn op_skip_key_not_pressed(&mut self, x: u8) -> Option<Fault> {
        let pressed = self.keyboard.borrow().is_pressed(self.registers[x as usize]);
        if !pressed {
            self.skip();
        }
        None
    }

    fn op_get_key(&mut self, x: u8) -> Option<Fault> {
        let mut pressed_key = None;
        {
            let mut keyboard = self.keyboard.borrow_mut();
            for key in 0..consts::KEY_COUNT as u8 {
                if keyboard.is_pressed(key) {
                    keyboard.release(key);
                    pressed_key = Some(key);
                    break;
                }
            }
        }

        match pressed_key {
            Some(key) => self.registers[x as usize] = key,
            // No key down: rewind so this instruction is fetched again on
            // the next cycle.
            None => self.pc = self.pc.wrapping_sub(consts::OP_CODE_BYTES as u16),
        }

        self.notify_program_counter();
        self.notify_register(x as usize);
        None
    }

    fn op_get_delay_timer(&mut self, x: u8) -> Option<Fault> {
        self.registers[x as usize] = self.delay_timer;
        self.notify_register(x as usize);
        None
    }

    fn op_set_delay_timer(&mut self, x: u8) -> Option<Fault> {
        self.delay_timer = self.registers[x as usize];
        let value = self.delay_timer;
        self.notify(|o| o.delay_timer_changed(value));
        None
    }

    fn op_set_sound_timer(&mut self, x: u8) -> Option<Fault> {
        self.sound_timer = self.registers[x as usize];
        let value = self.sound_timer;
        self.notify(|o| o.sound_timer_changed(value));
        None
    }

    fn op_add_address(&mut self, x: u8) -> Option<Fault> {
        self.address_register = self
            .address_register
            .wrapping_add(self.registers[x as usize] as u16);
        self.notify_address_register();

        // VF is set on 12-bit overflow and otherwise left alone.
        if self.address_register > consts::ADDR_MAX {
            self.registers[consts::FLAG_REGISTER] = 1;
            self.notify_register(consts::FLAG_REGISTER);
        } else if self.quirks.index_add_clears_flag {
            self.registers[consts::FLAG_REGISTER] = 0;
            self.notify_register(consts::FLAG_REGISTER);
        }
        None
    }

    fn op_set_address_sprite(&mut self, x: u8) -> Option<Fault> {
        self.address_register = self
            .memory
            .borrow()
            .sprite_glyph_address(self.registers[x as usize]);
        self.notify_address_register();
        None
    }

    fn op_store_bcd(&mut self, x: u8) -> Option<Fault> {
        let value = self.registers[x as usize];
        {
            let mut memory = self.memory.borrow_mut();
            memory.write_byte(self.address_register, value / 100);
            memory.write_byte(self.address_register.wrapping_add(1), (value % 100) / 10);
            memory.write_byte(self.address_register.wrapping_add(2), value % 10);
        }
        self.notify(|o| o.memory_changed());
        None
    }

    fn op_dump_registers(&mut self, x: u8) -> Option<Fault> {
        {
            let mut memory = self.memory.borrow_mut();
            for reg_num in 0..=x as usize {
                memory.write_byte(self.address_register, self.registers[reg_num]);
                self.address_register = self.address_register.wrapping_add(1);
            }
        }
        self.notify(|o| o.memory_changed());
        self.notify_address_register();
        None
    }

    fn op_load_registers(&mut self, x: u8) -> Option<Fault> {
        for reg_num in 0..=x as usize {
            self.registers[reg_num] = self.memory.borrow().read_byte(self.address_register);
            self.address_register = self.address_register.wrapping_add(1);
            self.notify_register(reg_num);
        }
        self.notify_address_register();
        None
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

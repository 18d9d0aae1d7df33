use std::cell::RefCell;
use std::env;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use chip8_vm::core::display::Display;
use chip8_vm::core::interpreter::Interpreter;
use chip8_vm::core::keyboard::Keyboard;
use chip8_vm::core::memory::Memory;
use chip8_vm::core::observer::Observer;
use chip8_vm::core::rom::Rom;
use chip8_vm::external::input::KeyboardDriver;
use chip8_vm::external::output::DisplayDriver;

/// Instruction cycles per display frame; timers tick once per frame.
const CYCLES_PER_FRAME: usize = 10;
const FRAME_TIME: Duration = Duration::from_millis(16);

/// Observer bridging the core to the frame loop: remembers whether any
/// instruction since the last frame asked for a redraw.
#[derive(Default)]
struct FrameSync {
    refresh_needed: bool,
}

impl FrameSync {
    fn take_refresh(&mut self) -> bool {
        std::mem::take(&mut self.refresh_needed)
    }
}

impl Observer for FrameSync {
    fn display_refresh_requested(&mut self) {
        self.refresh_needed = true;
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        Err("Need to specify rom path")?;
    }
    let rom = Rom::from_file(args[1].as_str())?;

    let memory = Rc::new(RefCell::new(Memory::default()));
    let display = Rc::new(RefCell::new(Display::default()));
    let keyboard = Rc::new(RefCell::new(Keyboard::default()));

    let mut chip8 = Interpreter::with_components(
        Rc::clone(&memory),
        Rc::clone(&display),
        Rc::clone(&keyboard),
    );
    let frame_sync = Rc::new(RefCell::new(FrameSync::default()));
    chip8.attach_observer(frame_sync.clone());
    chip8.reset();
    chip8.load_program(&rom);

    let context = sdl2::init()?;
    let mut output = DisplayDriver::new(&context, &display)?;
    let mut input = KeyboardDriver::new(&context, &keyboard)?;

    while input.poll().is_ok() {
        for _ in 0..CYCLES_PER_FRAME {
            chip8.cycle();
        }
        chip8.cycle_delay();
        chip8.cycle_sound();

        if frame_sync.borrow_mut().take_refresh() {
            output.draw()?;
        }
        thread::sleep(FRAME_TIME);
    }
    Ok(())
}

use sdl2;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use crate::consts;
use crate::core::keyboard::Keyboard;
use std::cell::RefCell;
use std::rc::Rc;

/// Polls SDL for keyboard state and mirrors it into the shared [`Keyboard`]
/// using the conventional 4x4 layout (1234 / QWER / ASDF / ZXCV).
pub struct KeyboardDriver {
    events: sdl2::EventPump,
    keyboard: Rc<RefCell<Keyboard>>,
}

impl KeyboardDriver {
    pub fn new(
        context: &sdl2::Sdl,
        keyboard: &Rc<RefCell<Keyboard>>,
    ) -> Result<Self, &'static str> {
        Ok(KeyboardDriver {
            events: match context.event_pump() {
                Ok(t) => t,
                Err(_) => return Err("Could not obtain event context"),
            },
            keyboard: Rc::clone(keyboard),
        })
    }

    pub fn poll(&mut self) -> Result<(), &'static str> {
        for event in self.events.poll_iter() {
            match event {
                Event::Quit { .. } => return Err("Received quit event"),
                _ => continue,
            }
        }

        let keys: Vec<Keycode> = self
            .events
            .keyboard_state()
            .pressed_scancodes()
            .filter_map(Keycode::from_scancode)
            .collect();

        let mut pressed = [false; consts::KEY_COUNT];
        for key in keys {
            let index = match key {
                Keycode::Num1 => Some(0x1),
                Keycode::Num2 => Some(0x2),
                Keycode::Num3 => Some(0x3),
                Keycode::Num4 => Some(0xC),
                Keycode::Q => Some(0x4),
                Keycode::W => Some(0x5),
                Keycode::E => Some(0x6),
                Keycode::R => Some(0xD),
                Keycode::A => Some(0x7),
                Keycode::S => Some(0x8),
                Keycode::D => Some(0x9),
                Keycode::F => Some(0xE),
                Keycode::Z => Some(0xA),
                Keycode::X => Some(0x0),
                Keycode::C => Some(0xB),
                Keycode::V => Some(0xF),
                Keycode::Escape => return Err("Received interrupt, exiting..."),
                _ => None,
            };

            if let Some(i) = index {
                pressed[i as usize] = true;
            }
        }

        let mut keyboard = self.keyboard.borrow_mut();
        for (i, &down) in pressed.iter().enumerate() {
            if down {
                keyboard.press(i as u8);
            } else {
                keyboard.release(i as u8);
            }
        }
        Ok(())
    }
}

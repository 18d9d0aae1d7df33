use crate::consts;
use crate::core::display::Display;
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use sdl2::render::Canvas;
use sdl2::video::Window;
use std::cell::RefCell;
use std::rc::Rc;

/// Rasterizes the shared [`Display`] buffer onto an SDL canvas, one scaled
/// rectangle per pixel.
pub struct DisplayDriver {
    screen: Canvas<Window>,
    display: Rc<RefCell<Display>>,
}

impl DisplayDriver {
    pub fn new(context: &sdl2::Sdl, display: &Rc<RefCell<Display>>) -> Result<Self, &'static str> {
        let video_subsystem = match context.video() {
            Ok(v) => v,
            Err(_) => return Err("Could not obtain video context"),
        };
        let window = match video_subsystem
            .window(
                "CHIP-8",
                consts::DISPL_WIDTH as u32 * consts::SCALE_FACTOR,
                consts::DISPL_HEIGHT as u32 * consts::SCALE_FACTOR,
            )
            .build()
        {
            Ok(w) => w,
            Err(_) => return Err("Could not create window"),
        };
        let mut canvas: Canvas<Window> = match window.into_canvas().present_vsync().build() {
            Ok(c) => c,
            Err(_) => return Err("Could not create canvas"),
        };

        canvas.clear();
        canvas.present();

        Ok(DisplayDriver {
            screen: canvas,
            display: Rc::clone(display),
        })
    }

    pub fn draw(&mut self) -> Result<(), &'static str> {
        for (y, row) in self.display.borrow().rows().iter().enumerate() {
            for (x, &pixel) in row.iter().enumerate() {
                let i = (x as u32) * consts::SCALE_FACTOR;
                let j = (y as u32) * consts::SCALE_FACTOR;

                self.screen.set_draw_color(match pixel {
                    0 => Color::RGB(0, 0, 0),
                    1 => Color::RGB(0, 255, 0),
                    _ => return Err("Invalid (non-binary) pixel value"),
                });
                let _ = self.screen.fill_rect(Rect::new(
                    i as i32,
                    j as i32,
                    consts::SCALE_FACTOR,
                    consts::SCALE_FACTOR,
                ));
            }
        }
        self.screen.present();
        Ok(())
    }
}

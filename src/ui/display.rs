//! SSD1306 OLED display wrapper.

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_7X13_BOLD};
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use embedded_graphics::text::Text;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;
use wrd_alerts::config::{DISPLAY_BODY_LINES, DISPLAY_CHARS_PER_LINE, DISPLAY_WIDTH};

/// Type alias for the concrete display driver.
///
/// Generic over the I²C implementation so callers pass in their HAL's
/// I²C peripheral.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// Initialise the SSD1306 display and clear the screen.
pub fn init<I2C>(i2c: I2C) -> Display<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    let _ = display.init();
    display.clear_buffer();
    let _ = display.flush();
    display
}

fn title_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_7X13_BOLD)
        .text_color(BinaryColor::On)
        .build()
}

fn body_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

/// Render an alert: bold title, a rule, then the body wrapped over
/// `DISPLAY_BODY_LINES` rows. Anything past the last row is cut.
pub fn draw_alert<I2C>(display: &mut Display<I2C>, title: &str, body: &str)
where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();

    let title = wrapped(title).next().unwrap_or("");
    let _ = Text::new(title, Point::new(0, 11), title_style()).draw(display);
    let _ = Line::new(Point::new(0, 15), Point::new(DISPLAY_WIDTH as i32 - 1, 15))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(display);

    for (row, line) in wrapped(body).take(DISPLAY_BODY_LINES).enumerate() {
        let y = 26 + (row as i32 * 11);
        let _ = Text::new(line, Point::new(0, y), body_style()).draw(display);
    }

    let _ = display.flush();
}

/// Blank the screen once an alert has timed out.
pub fn clear<I2C>(display: &mut Display<I2C>)
where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();
    let _ = display.flush();
}

/// Split `text` into rows of at most `DISPLAY_CHARS_PER_LINE` characters.
///
/// Always splits on a char boundary; device names are arbitrary UTF-8.
fn wrapped(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    core::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let end = rest
            .char_indices()
            .nth(DISPLAY_CHARS_PER_LINE)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (line, tail) = rest.split_at(end);
        rest = tail;
        Some(line)
    })
}

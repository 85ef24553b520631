//
// screenshot.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Jun 20 2021
//

use clap::Args;
use nescore::{Nes, Cartridge};
use nesle::{render, NesleError};

#[derive(Args, Debug)]
pub struct Options {
    /// ROM file
    rom: String,
    /// Frames to run before taking the screenshot
    #[arg(long, default_value_t = 120)]
    frames: u32,
    /// Output file name
    #[arg(short = 'o', long = "output", default_value = "screenshot.png")]
    output: String,
}

pub fn dispatch(opts: Options) -> Result<(), NesleError> {
    let mut nes = Cartridge::from_path(&opts.rom).and_then(|cart| Nes::default().with_cart(cart))?;

    for _ in 0..opts.frames {
        nes.emulate_frame();
    }

    render::save_png(&opts.output, nes.frame())?;
    tracing::info!(output = %opts.output, frames = opts.frames, "saved screenshot");

    Ok(())
}

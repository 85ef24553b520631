//
// render.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Jun 08 2021
//

use image::{ImageFormat, RgbImage};
use nescore::{palette, DISPLAY_WIDTH, DISPLAY_HEIGHT, RGB_FRAME_SIZE};

use crate::error::NesleError;

use std::path::{Path, PathBuf};

/// Convert a frame of palette indices to an RGB image
pub fn to_image(screen: &[u8]) -> Result<RgbImage, NesleError> {
    let mut rgb = vec![0u8; RGB_FRAME_SIZE];
    palette::fill_rgb(screen, &mut rgb);

    RgbImage::from_raw(DISPLAY_WIDTH as u32, DISPLAY_HEIGHT as u32, rgb)
        .ok_or(NesleError::BufferTooSmall { needed: DISPLAY_WIDTH * DISPLAY_HEIGHT, capacity: screen.len() })
}

/// Write a frame of palette indices as a PNG
pub fn save_png<P: AsRef<Path>>(path: P, screen: &[u8]) -> Result<(), NesleError> {
    if screen.len() < DISPLAY_WIDTH * DISPLAY_HEIGHT {
        return Err(NesleError::BufferTooSmall { needed: DISPLAY_WIDTH * DISPLAY_HEIGHT, capacity: screen.len() });
    }

    to_image(screen)?.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// File a rendered frame is written to
pub fn frame_path<P: AsRef<Path>>(dir: P, frame_number: u64) -> PathBuf {
    dir.as_ref().join(format!("frame_{:08}.png", frame_number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_file_names() {
        assert_eq!(frame_path("out", 42), Path::new("out").join("frame_00000042.png"));
    }

    #[test]
    fn write_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screen.png");

        let mut screen = vec![0x0Fu8; DISPLAY_WIDTH * DISPLAY_HEIGHT];
        screen[0] = 0x16;
        save_png(&path, &screen).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (DISPLAY_WIDTH as u32, DISPLAY_HEIGHT as u32));

        let (r, g, b) = palette::rgb(0x16);
        assert_eq!(img.get_pixel(0, 0).0, [r, g, b]);
    }

    #[test]
    fn short_screen_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = save_png(dir.path().join("short.png"), &[0u8; 16]);

        assert!(matches!(result, Err(NesleError::BufferTooSmall { .. })));
    }
}

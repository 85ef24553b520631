//
// palette.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Oct 02 2020
//

//! NES master palette

/// Number of colors in the master palette
pub const PALETTE_SIZE: usize = 64;

pub type Rgb = (u8, u8, u8);

const MASTER_PALETTE: [Rgb; PALETTE_SIZE] = [
    (84, 84, 84), (0, 30, 116), (8, 22, 147), (48, 12, 154), (92, 4, 121), (136, 6, 85), (147, 22, 34), (132, 48, 0),
    (76, 84, 0), (12, 102, 0), (0, 120, 44), (0, 106, 132), (0, 84, 136), (0, 0, 0), (0, 0, 0), (0, 0, 0),

    (160, 160, 160), (0, 70, 196), (48, 92, 255), (92, 70, 255), (136, 58, 255), (196, 78, 255), (204, 92, 204), (255, 114, 136),
    (255, 147, 84), (255, 173, 0), (216, 196, 0), (120, 214, 0), (0, 230, 116), (0, 196, 214), (0, 160, 255), (0, 0, 0),

    (255, 255, 255), (48, 152, 255), (120, 147, 255), (176, 138, 255), (220, 132, 255), (255, 152, 255), (255, 165, 214), (255, 188, 160),
    (255, 214, 136), (255, 234, 120), (255, 255, 160), (188, 255, 160), (120, 255, 188), (120, 255, 255), (120, 214, 255), (84, 84, 255),

    (255, 255, 255), (166, 230, 255), (188, 220, 255), (204, 214, 255), (214, 204, 255), (220, 204, 255), (214, 208, 230), (220, 214, 204),
    (234, 220, 196), (255, 230, 188), (240, 234, 196), (214, 240, 196), (188, 244, 214), (188, 244, 230), (188, 230, 244), (176, 176, 255),
];

/// RGB value of a palette index. Only the lower 6 bits are used
pub fn rgb(index: u8) -> Rgb {
    MASTER_PALETTE[(index & 0x3F) as usize]
}

/// Convert palette indices to packed RGB24. Stops when either buffer runs out.
/// Returns the number of pixels converted
pub fn fill_rgb(raw: &[u8], out: &mut [u8]) -> usize {
    let mut count = 0;

    for (index, dst) in raw.iter().zip(out.chunks_exact_mut(3)) {
        let (r, g, b) = rgb(*index);
        dst[0] = r;
        dst[1] = g;
        dst[2] = b;
        count += 1;
    }

    count
}

/// Luma of a palette index (ITU-R BT.601 weights)
pub fn luminance(index: u8) -> u8 {
    let (r, g, b) = rgb(index);
    let y = 299 * r as u32 + 587 * g as u32 + 114 * b as u32;

    ((y + 500) / 1000) as u8
}

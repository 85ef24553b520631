//
// ppu/sprite.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Mar 07 2020
//

/// Object Attribute Memory entry
#[derive(Default, Copy, Clone)]
pub struct Sprite {
    pub y: u8,
    pub x: u8,
    pub tile: u8,
    attr: u8,
}

impl From<&[u8]> for Sprite {
    fn from(data: &[u8]) -> Self {
        Sprite {
            y: data[0],
            x: data[3],
            tile: data[1],
            attr: data[2],
        }
    }
}

impl Sprite {
    pub fn palette(&self) -> u8 {
        self.attr & 0x03
    }

    /// Sprite is drawn behind the background
    pub fn priority(&self) -> bool {
        bit_is_set!(self.attr, 5)
    }

    pub fn flip_v(&self) -> bool {
        bit_is_set!(self.attr, 7)
    }

    pub fn flip_h(&self) -> bool {
        bit_is_set!(self.attr, 6)
    }

    /// Pattern table address of the given row of this sprite
    pub fn pattern_addr(&self, row: u8, height: u8, table: u16) -> u16 {
        let row = if self.flip_v() { height - 1 - row } else { row };

        if height == 16 {
            // 8x16 sprites select the table with bit 0 of the tile number
            let table = (self.tile & 0x01) as u16 * 0x1000;
            let tile = (self.tile & 0xFE) as u16 + (row >= 8) as u16;
            table + tile * 16 + (row & 0x07) as u16
        }
        else {
            table + self.tile as u16 * 16 + row as u16
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_from_slice() {
        let data: [u8; 4] = [1, 2, 0, 3];
        let sprite = Sprite::from(&data[..]);

        assert_eq!(sprite.x, 3);
        assert_eq!(sprite.y, 1);
        assert_eq!(sprite.tile, 2);
    }

    #[test]
    fn sprite_attributes() {
        let data: [u8; 4] = [0, 0, 0xFF, 0];
        let sprite = Sprite::from(&data[..]);

        assert_eq!(sprite.palette(), 3);
        assert_eq!(sprite.priority(), true);
        assert_eq!(sprite.flip_v(), true);
        assert_eq!(sprite.flip_h(), true);
    }

    #[test]
    fn pattern_address_8x8() {
        let sprite = Sprite::from(&[0u8, 0x10, 0x00, 0][..]);
        assert_eq!(sprite.pattern_addr(3, 8, 0x1000), 0x1103);

        let flipped = Sprite::from(&[0u8, 0x10, 0x80, 0][..]);
        assert_eq!(flipped.pattern_addr(0, 8, 0x0000), 0x0107);
    }

    #[test]
    fn pattern_address_8x16() {
        // Odd tile selects the $1000 table
        let sprite = Sprite::from(&[0u8, 0x21, 0x00, 0][..]);
        assert_eq!(sprite.pattern_addr(0, 16, 0x0000), 0x1200);
        assert_eq!(sprite.pattern_addr(9, 16, 0x0000), 0x1211);

        let flipped = Sprite::from(&[0u8, 0x20, 0x80, 0][..]);
        assert_eq!(flipped.pattern_addr(0, 16, 0x1000), 0x0217);
    }
}

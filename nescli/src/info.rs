//
// info.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Mar 13 2020
//

use clap::Args;
use nescore::{Cartridge, is_mapper_supported};
use nesle::NesleError;

#[derive(Args)]
pub struct Options {
    /// ROM file
    rom: String,
}

pub fn dispatch(opts: Options) -> Result<(), NesleError> {
    let cart = Cartridge::from_path(&opts.rom)?;
    let checksum = cart.checksum();
    let (info, prg_rom, chr_rom, _) = cart.into_parts();

    println!("{}", info);
    println!("PRG ROM Size:        {} bytes", prg_rom.len());
    println!("CHR ROM Size:        {} bytes", chr_rom.len());
    println!("CRC-32:              {:08X}", checksum);
    println!("Supported:           {}", is_mapper_supported(info.mapper));

    Ok(())
}

//
// lib.rs
//
// @author Natesh Narain <nnaraindev@gmail.com>
// @date Mar 13 2020
//
pub mod info;
pub mod play;
pub mod screenshot;

use clap::{Parser, Subcommand};

#[derive(Subcommand)]
pub enum Command {
    /// Dump the header information of the specified ROM file
    Info(info::Options),
    /// Run a random agent through a number of episodes
    Play(play::Options),
    /// Run the ROM for a number of frames and save the screen
    Screenshot(screenshot::Options),
}

#[derive(Parser)]
#[command(name = "nescli", version, author = "Natesh Narain", about = "NES learning environment tools")]
pub struct Options {
    #[command(subcommand)]
    pub cmd: Command,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_play() {
        let opts = Options::try_parse_from([
            "nescli", "play", "mario.nes", "--episodes", "3", "--frame-skip", "2", "--seed", "9", "--eb",
        ]).unwrap();

        match opts.cmd {
            Command::Play(play) => {
                assert_eq!(play.rom, "mario.nes");
                assert_eq!(play.episodes, 3);
                assert_eq!(play.frame_skip, 2);
                assert_eq!(play.seed, 9);
                assert_eq!(play.max_frames, 10000);
                assert!(play.eb);
            },
            _ => panic!("expected play"),
        }
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Options::try_parse_from(["nescli"]).is_err());
        assert!(Options::try_parse_from(["nescli", "info"]).is_err());
        assert!(Options::try_parse_from(["nescli", "screenshot", "game.nes", "-o", "out.png"]).is_ok());
    }
}

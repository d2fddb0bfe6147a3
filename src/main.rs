use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::info;

use chip8_emulator::chip::{
    chip8::{Chip8, Chip8Error, DISPLAY_WIDTH},
    Chip, LoadProgramError,
};
use chip8_emulator::config::{ConfigArgs, ConfigError};
use chip8_emulator::logging;

/// Runs a CHIP-8 program for a fixed number of cycles and prints the final
/// screen and registers.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Path to the program to load
    rom: PathBuf,

    /// Number of cycles to execute
    #[arg(short = 'n', long, default_value_t = 1000)]
    cycles: u64,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Debug, Error)]
enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    InvalidProgram(#[from] LoadProgramError),

    #[error("Emulation stopped after {cycles} cycles at pc {pc:#05x}: {source}")]
    Emulation {
        cycles: u64,
        pc: u16,
        source: Chip8Error,
    },
}

/// Renders the framebuffer with one line per row, `#` for lit pixels.
fn screen_to_text(pixels: &[bool]) -> String {
    let mut text = String::with_capacity(pixels.len() + pixels.len() / DISPLAY_WIDTH);
    for row in pixels.chunks(DISPLAY_WIDTH) {
        text.extend(row.iter().map(|&lit| if lit { '#' } else { '.' }));
        text.push('\n');
    }
    text
}

fn registers_to_text(chip8: &Chip8) -> String {
    let mut text = String::new();
    for (i, value) in chip8.registers().iter().enumerate() {
        text.push_str(&format!("V{:X}={:02x} ", i, value));
    }
    text.push_str(&format!(
        "\nPC={:#05x} I={:#05x} DT={} ST={}",
        chip8.program_counter(),
        chip8.index_register(),
        chip8.delay_timer(),
        chip8.sound_timer()
    ));
    text
}

fn run(args: Args) -> Result<(), Error> {
    let config = args.config.load()?;
    logging::init_stderr(&config.log_filter);

    let mut chip8 = config.build_chip();
    chip8.load_program(&args.rom)?;

    for executed in 0..args.cycles {
        let pc = chip8.program_counter();
        chip8.cycle().map_err(|source| Error::Emulation {
            cycles: executed,
            pc,
            source,
        })?;
    }
    info!(cycles = args.cycles, "run finished");

    print!("{}", screen_to_text(chip8.read_output_pins()));
    println!("{}", registers_to_text(&chip8));
    Ok(())
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chip8_emulator::chip::chip8::DISPLAY_HEIGHT;

    #[test]
    fn test_screen_to_text() {
        let mut pixels = vec![false; DISPLAY_WIDTH * DISPLAY_HEIGHT];
        pixels[0] = true;
        pixels[DISPLAY_WIDTH + 2] = true;

        let text = screen_to_text(&pixels);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), DISPLAY_HEIGHT);
        assert!(lines.iter().all(|line| line.len() == DISPLAY_WIDTH));
        assert!(lines[0].starts_with("#."));
        assert!(lines[1].starts_with("..#."));
        assert_eq!(text.matches('#').count(), 2);
    }

    #[test]
    fn test_registers_to_text() {
        let mut chip8 = Chip8::with_seed(1);
        chip8.load_program_bytes(&[0x6A, 0x3F]).unwrap();
        chip8.cycle().unwrap();

        let text = registers_to_text(&chip8);
        assert!(text.contains("VA=3f"));
        assert!(text.contains("PC=0x202"));
    }

    #[test]
    fn test_args() {
        let args = Args::try_parse_from(["chip8-emulator", "game.ch8", "-n", "50", "--seed", "3"])
            .unwrap();
        assert_eq!(args.cycles, 50);
        assert_eq!(args.config.seed, Some(3));
        assert_eq!(args.rom, PathBuf::from("game.ch8"));
    }
}

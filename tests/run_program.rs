use std::io::Write;

use chip8_emulator::chip::{
    chip8::{Chip8, Chip8Error},
    Chip,
};

fn load(program: &[u8]) -> Chip8 {
    let mut rom = tempfile::NamedTempFile::new().unwrap();
    rom.write_all(program).unwrap();

    let mut chip8 = Chip8::with_seed(0);
    assert_eq!(chip8.load_program(rom.path()).unwrap(), program.len());
    chip8
}

fn run(chip8: &mut Chip8, cycles: usize) {
    for _ in 0..cycles {
        chip8.cycle().unwrap();
    }
}

#[test]
fn draws_font_glyph() {
    let mut chip8 = load(&[
        0x60, 0x05, // V0 = 5
        0xF0, 0x29, // I = glyph of V0
        0x61, 0x0A, // V1 = 10
        0x62, 0x05, // V2 = 5
        0xD1, 0x25, // draw 5 rows at (V1, V2)
        0x12, 0x0A, // spin
    ]);
    run(&mut chip8, 20);

    assert_eq!(chip8.program_counter(), 0x20A);
    assert_eq!(chip8.register(0xF).unwrap(), 0);
    for x in 10..14 {
        assert!(chip8.pixel(x, 5).unwrap());
    }
    assert!(!chip8.pixel(14, 5).unwrap());
    assert!(chip8.pixel(10, 6).unwrap());
    assert!(!chip8.pixel(11, 6).unwrap());
    assert!(chip8.pixel(13, 8).unwrap());
    assert!(!chip8.pixel(10, 8).unwrap());
    assert_eq!(chip8.read_output_pins().iter().filter(|&&p| p).count(), 14);
}

#[test]
fn stores_and_loads_decimal_digits() {
    let mut chip8 = load(&[
        0x6A, 0x7B, // VA = 123
        0xA3, 0x00, // I = 0x300
        0xFA, 0x33, // BCD of VA at I
        0xF2, 0x65, // V0..=V2 = memory[I..]
    ]);
    run(&mut chip8, 4);

    assert_eq!(&chip8.registers()[..3], &[1, 2, 3]);
    assert_eq!(chip8.index_register(), 0x300);
}

#[test]
fn stops_on_unsupported_opcode() {
    let mut chip8 = load(&[0x61, 0x01, 0x51, 0x21]);
    run(&mut chip8, 1);

    assert_eq!(chip8.cycle(), Err(Chip8Error::UnsupportedOpcode(0x5121)));
    assert_eq!(chip8.program_counter(), 0x202);
}

#[test]
fn key_press_ends_wait() {
    let mut chip8 = load(&[0xF3, 0x0A, 0x12, 0x02]);
    run(&mut chip8, 3);
    assert_eq!(chip8.program_counter(), 0x200);

    chip8.set_input_pin(0x7, true).unwrap();
    run(&mut chip8, 1);
    assert_eq!(chip8.register(3).unwrap(), 0x7);
    assert_eq!(chip8.program_counter(), 0x202);

    assert_eq!(
        chip8.set_input_pin(0x10, true),
        Err(Chip8Error::InvalidKey(0x10))
    );
}

use crate::chip::chip8::Chip8;

/// Skips the next instruction if `f` holds for the given instruction and state.
pub fn conditional_skip<T>(instruction: &T, state: &mut Chip8, f: fn(&T, &Chip8) -> bool) {
    if f(instruction, state) {
        increment_program_counter(state);
    }
}

pub fn increment_program_counter(state: &mut Chip8) {
    state.program_counter = state.program_counter.wrapping_add(2);
}

use std::collections::HashMap;

/// One variant per instruction the machine implements. The interpreter
/// resolves a fetched word to an `Op` through the masked-key table and
/// dispatches with a single exhaustive match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    ClearScreen,
    Return,
    SystemCall,
    Jump,
    Call,
    SkipEqualValue,
    SkipNotEqualValue,
    SkipEqualRegister,
    AssignValue,
    AddValue,
    AssignRegister,
    Or,
    And,
    Xor,
    AddRegister,
    SubtractRegister,
    ShiftRight,
    SubtractNegative,
    ShiftLeft,
    SkipNotEqualRegister,
    SetAddress,
    JumpOffset,
    Random,
    Draw,
    SkipKeyPressed,
    SkipKeyNotPressed,
    GetDelayTimer,
    GetKey,
    SetDelayTimer,
    SetSoundTimer,
    AddAddress,
    SetAddressSprite,
    StoreBcd,
    DumpRegisters,
    LoadRegisters,
}

/// Build the masked-key operation table. Keys are the instruction word
/// masked by [`refine_key`]; building is idempotent.
pub fn operation_table() -> HashMap<u16, Op> {
    HashMap::from([
        (0x00E0, Op::ClearScreen),
        (0x00EE, Op::Return),
        (0x0000, Op::SystemCall),
        (0x1000, Op::Jump),
        (0x2000, Op::Call),
        (0x3000, Op::SkipEqualValue),
        (0x4000, Op::SkipNotEqualValue),
        (0x5000, Op::SkipEqualRegister),
        (0x6000, Op::AssignValue),
        (0x7000, Op::AddValue),
        (0x8000, Op::AssignRegister),
        (0x8001, Op::Or),
        (0x8002, Op::And),
        (0x8003, Op::Xor),
        (0x8004, Op::AddRegister),
        (0x8005, Op::SubtractRegister),
        (0x8006, Op::ShiftRight),
        (0x8007, Op::SubtractNegative),
        (0x800E, Op::ShiftLeft),
        (0x9000, Op::SkipNotEqualRegister),
        (0xA000, Op::SetAddress),
        (0xB000, Op::JumpOffset),
        (0xC000, Op::Random),
        (0xD000, Op::Draw),
        (0xE09E, Op::SkipKeyPressed),
        (0xE0A1, Op::SkipKeyNotPressed),
        (0xF007, Op::GetDelayTimer),
        (0xF00A, Op::GetKey),
        (0xF015, Op::SetDelayTimer),
        (0xF018, Op::SetSoundTimer),
        (0xF01E, Op::AddAddress),
        (0xF029, Op::SetAddressSprite),
        (0xF033, Op::StoreBcd),
        (0xF055, Op::DumpRegisters),
        (0xF065, Op::LoadRegisters),
    ])
}

/// Reduce an instruction word to its table lookup key. The top nibble alone
/// does not identify every operation: 0x00E0/0x00EE must be told apart from
/// the generic 0x0nnn system call, the 0x5/0x8/0x9 families carry a
/// sub-opcode in the low nibble, and the 0xE/0xF families in the low byte.
pub fn refine_key(word: u16) -> u16 {
    let mut key = word & 0xF000;

    if key == 0x0000 && matches!(word & 0x00FF, 0x00E0 | 0x00EE) {
        key = word & 0xF0FF;
    }

    if matches!(key, 0x5000 | 0x8000 | 0x9000) {
        key = word & 0xF00F;
    }

    if matches!(key, 0xE000 | 0xF000) {
        key = word & 0xF0FF;
    }

    key
}

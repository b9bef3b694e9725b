// PPU video-memory address coercion.
//
// The Bus's video-memory array is a flat 16KB buffer; this module owns the
// address math that maps a raw 14-bit PPU address down to its canonical
// backing-store index, folding the `$3000-$3EFF` nametable alias, palette
// mirroring, and (depending on cartridge mirroring) nametable mirroring
// into a single idempotent function.

use crate::cartridge::Mirroring;

/// Coerce a raw PPU address into its canonical index into the Bus's
/// video-memory array. Idempotent: `coerce(coerce(a)) == coerce(a)`.
pub(super) fn coerce_vram_addr(addr: u16, mirroring: Mirroring) -> u16 {
    let addr = addr & 0x3FFF;
    let addr = if (0x3000..=0x3EFF).contains(&addr) {
        addr - 0x1000
    } else {
        addr
    };

    if addr >= 0x3F00 {
        let palette_addr = 0x3F00 | (addr & 0x1F);
        return match palette_addr {
            0x3F10 | 0x3F14 | 0x3F18 | 0x3F1C => palette_addr - 0x10,
            other => other,
        };
    }

    mirror_nametable(addr, mirroring)
}

/// Fold one of the four logical 1KB nametables into its canonical physical
/// table (0 or 2 for horizontal mirroring, 0 or 1 for vertical), per the
/// equivalences in the module-level invariants.
fn mirror_nametable(addr: u16, mirroring: Mirroring) -> u16 {
    let offset = addr - 0x2000;
    let table = offset / 0x0400;
    let within = offset % 0x0400;

    let canonical_table = match mirroring {
        Mirroring::Horizontal => {
            if table == 0 || table == 1 {
                0
            } else {
                2
            }
        }
        Mirroring::Vertical => {
            if table == 0 || table == 2 {
                0
            } else {
                1
            }
        }
    };

    0x2000 + canonical_table * 0x0400 + within
}

//! `PT_LOAD` size alignment.
//!
//! When a segment's `p_align` exceeds the runtime page size, the dynamic
//! linker maps and mprotects each segment at page boundaries instead of
//! `p_align` boundaries, leaving an unmapped `---p` hole between
//! consecutive `PT_LOAD` mappings and costing an extra vm_area_struct per
//! hole. Rounding `p_filesz` and `p_memsz` up to the segment's own
//! alignment closes the hole.
//!
//! Offsets and addresses are never touched, so `p_offset` and `p_vaddr`
//! stay congruent modulo `p_align` and the rewritten file remains loadable.

use crate::binary::Elf64Binary;

/// Round `size` up to the next multiple of `align`.
///
/// `align` must be a power of two, which holds for every real ELF64
/// toolchain and is not re-validated here.
pub fn round_up(size: u64, align: u64) -> u64 {
    (size + align - 1) & !(align - 1)
}

/// Align every `PT_LOAD` program header's file and memory size to that
/// header's own alignment, in place. Non-loadable headers are left alone.
///
/// Idempotent: rounding an already-rounded value is a no-op.
pub fn align_phdrs(binary: &mut Elf64Binary) {
    log::debug!("number of program headers: {}", binary.phdrs.len());

    for (i, phdr) in binary.phdrs.iter_mut().enumerate() {
        if !phdr.is_load() {
            continue;
        }

        let p_memsz = phdr.p_memsz;
        let p_filesz = phdr.p_filesz;
        let p_align = phdr.p_align;
        log::info!(
            "PT_LOAD segment {i}: p_memsz {p_memsz} p_filesz {p_filesz} p_align {p_align}"
        );

        // p_align of 0 or 1 means no alignment constraint.
        if p_align <= 1 {
            continue;
        }

        phdr.p_filesz = round_up(p_filesz, p_align);
        phdr.p_memsz = round_up(p_memsz, p_align);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_binary;
    use crate::types::{PF_R, PT_NOTE};
    use proptest::prelude::*;

    #[test]
    fn rounds_64k_aligned_segment_to_two_pages() {
        let mut binary = sample_binary();
        binary.phdrs[0].p_memsz = 67834;
        binary.phdrs[0].p_filesz = 67834;
        binary.phdrs[0].p_align = 65536;

        align_phdrs(&mut binary);

        let p_memsz = binary.phdrs[0].p_memsz;
        let p_filesz = binary.phdrs[0].p_filesz;
        assert_eq!(p_memsz, 131072);
        assert_eq!(p_filesz, 131072);
    }

    #[test]
    fn aligned_sizes_are_multiples_and_never_shrink() {
        let mut binary = sample_binary();
        let before: Vec<(u64, u64, u64)> = binary
            .phdrs
            .iter()
            .map(|p| (p.p_filesz, p.p_memsz, p.p_align))
            .collect();

        align_phdrs(&mut binary);

        for (phdr, (filesz, memsz, align)) in binary.phdrs.iter().zip(before) {
            let p_filesz = phdr.p_filesz;
            let p_memsz = phdr.p_memsz;
            assert_eq!(p_filesz % align, 0);
            assert_eq!(p_memsz % align, 0);
            assert!(p_filesz >= filesz);
            assert!(p_memsz >= memsz);
        }
    }

    #[test]
    fn non_load_headers_are_untouched() {
        let mut binary = sample_binary();
        binary.phdrs[1].p_type = PT_NOTE;
        binary.phdrs[1].p_flags = PF_R;
        binary.phdrs[1].p_memsz = 7;
        binary.phdrs[1].p_filesz = 7;

        align_phdrs(&mut binary);

        let p_memsz = binary.phdrs[1].p_memsz;
        let p_filesz = binary.phdrs[1].p_filesz;
        assert_eq!(p_memsz, 7);
        assert_eq!(p_filesz, 7);
    }

    #[test]
    fn zero_alignment_is_a_no_op() {
        let mut binary = sample_binary();
        binary.phdrs[0].p_align = 0;
        binary.phdrs[0].p_memsz = 5;
        binary.phdrs[0].p_filesz = 5;

        align_phdrs(&mut binary);

        let p_memsz = binary.phdrs[0].p_memsz;
        assert_eq!(p_memsz, 5);
    }

    proptest! {
        #[test]
        fn rounding_is_idempotent(size in 0u64..(1 << 40), shift in 12u32..17) {
            let align = 1u64 << shift;
            let once = round_up(size, align);
            prop_assert_eq!(once, round_up(once, align));
        }

        #[test]
        fn rounding_produces_next_multiple(size in 0u64..(1 << 40), shift in 12u32..17) {
            let align = 1u64 << shift;
            let rounded = round_up(size, align);
            prop_assert_eq!(rounded % align, 0);
            prop_assert!(rounded >= size);
            prop_assert!(rounded - size < align);
        }
    }
}

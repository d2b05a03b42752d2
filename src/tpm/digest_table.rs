//! Program-identity digest table (spec §4.4 step 6 / §4.8): a closed
//! configuration table keyed by computation kind, one triple of
//! `sha1`/`sha256`/`sha384` hex digests of the measured binary per kind.
//!
//! Values are the literal constants from
//! `generation/pkg/generation/claim_generation.go` (`ResnetModelSHA*`,
//! `LLaMaModelSHA*`, `BlockProcessingKRethSHA*`) — this table must agree
//! between claim generation (C8) and PCR replay verification (C4), so it
//! lives in one place shared by both.

use crate::claim::Computation;

pub struct ProgramIdentityDigests {
    pub sha1: &'static str,
    pub sha256: &'static str,
    pub sha384: &'static str,
}

pub const fn program_identity_digests(computation: Computation) -> ProgramIdentityDigests {
    match computation {
        Computation::ImgClass => ProgramIdentityDigests {
            sha1: "d24b18dbfffba75079c1f5dba667c97d6193a598",
            sha256: "5bee01fc5ba0d1225f7860cb856c630c38d31f803d7e2fb1d82c4f9de078276c",
            sha384: "ce8a2814c0707e0a0594a82ed3243f40a15c65b8ed8215e0ee08ff89abbffb1456730ea8d804c7d4b7938a88756df643",
        },
        Computation::TextGen => ProgramIdentityDigests {
            sha1: "5229bd4a103bf937e62c811218408ffa8aa62bad",
            sha256: "08a5566d61d7cb6b420c3e4387a39e0078e1f2fe5f055f3a03887385304d4bfa",
            sha384: "9e946a7e2d13afdd1bd08d6c5b5eee8840f10808e9bc5fe0da9eed8277e85644eb25fea58923e128c259d1c174968d6a",
        },
        Computation::BlockProcessingKreth => ProgramIdentityDigests {
            sha1: "db66208f41fd32f7f2cec2c245e17ac2a64eaad5",
            sha256: "bb28c5940f8cfa05e884103f10302ec58d23fc673ad92f1cd340bd85f2ab7b0c",
            sha384: "faee8766664dc039607e5cd59a65e77e55b0646da2cbadb12a35e594ae5d2cfe0f3b99b2e8439e174de255251f9ad933",
        },
    }
}

/// PCR index 23 is the only user-resettable bank in this design (spec
/// §4.4 step 6, GLOSSARY).
pub const PCR_INDEX: u32 = 23;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_computation_kind_has_a_table_entry() {
        for c in [
            Computation::ImgClass,
            Computation::TextGen,
            Computation::BlockProcessingKreth,
        ] {
            let digests = program_identity_digests(c);
            assert_eq!(digests.sha1.len(), 40);
            assert_eq!(digests.sha256.len(), 64);
            assert_eq!(digests.sha384.len(), 96);
        }
    }
}

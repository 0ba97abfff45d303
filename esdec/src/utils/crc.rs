//! CRC validation utilities for SFA access units.
//!
//! Table driven CRC-8 and CRC-16 over MSB-first polynomials. The SFA header is
//! protected by CRC-8 and the payload by CRC-16.

/// CRC algorithm specification with polynomial and initial value.
pub struct Algorithm<T> {
    poly: T,
    init: T,
}

/// CRC-8 algorithm for access unit header validation.
pub const CRC_HEADER_ALG: Algorithm<u8> = Algorithm {
    poly: 0x1d,
    init: 0x00,
};

/// CRC-16 algorithm for access unit payload validation.
pub const CRC_PAYLOAD_ALG: Algorithm<u16> = Algorithm {
    poly: 0x2d,
    init: 0x00,
};

/// Computes CRC-8 checksum using specified polynomial.
#[inline(always)]
pub const fn crc8(poly: u8, mut value: u8, len: usize) -> u8 {
    let mut i = 0;
    while i < len {
        value = (value << 1) ^ (((value >> 7) & 1) * poly);
        i += 1;
    }

    value
}

/// Computes CRC-16 checksum using specified polynomial.
#[inline(always)]
pub const fn crc16(poly: u16, mut value: u16, len: usize) -> u16 {
    value <<= 8;

    let mut i = 0;
    while i < len {
        value = (value << 1) ^ (((value >> 15) & 1) * poly);
        i += 1;
    }

    value
}

const fn crc8_table(poly: u8) -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < table.len() {
        table[i] = crc8(poly, i as u8, 8);
        i += 1;
    }

    table
}

const fn crc16_table(poly: u16) -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < table.len() {
        table[i] = crc16(poly, i as u16, 8);
        i += 1;
    }

    table
}

#[derive(Debug)]
pub struct Crc8 {
    pub poly: u8,
    pub init: u8,
    table: [u8; 256],
}

#[derive(Debug)]
pub struct Crc16 {
    pub poly: u16,
    pub init: u16,
    table: [u16; 256],
}

impl Crc8 {
    pub const fn new(algorithm: &Algorithm<u8>) -> Self {
        Self {
            poly: algorithm.poly,
            init: algorithm.init,
            table: crc8_table(algorithm.poly),
        }
    }

    #[inline(always)]
    pub const fn update(&self, mut crc: u8, bytes: &[u8]) -> u8 {
        let mut i = 0;

        while i < bytes.len() {
            crc = self.table[(crc ^ bytes[i]) as usize];
            i += 1;
        }

        crc
    }

    pub const fn checksum(&self, bytes: &[u8]) -> u8 {
        self.update(self.init, bytes)
    }
}

impl Crc16 {
    pub const fn new(algorithm: &Algorithm<u16>) -> Self {
        Self {
            poly: algorithm.poly,
            init: algorithm.init,
            table: crc16_table(algorithm.poly),
        }
    }

    #[inline(always)]
    pub const fn update(&self, mut crc: u16, bytes: &[u8]) -> u16 {
        let mut i = 0;

        while i < bytes.len() {
            let index = ((crc >> 8) as u8 ^ bytes[i]) as usize;
            crc = self.table[index] ^ (crc << 8);
            i += 1;
        }

        crc
    }

    pub const fn checksum(&self, bytes: &[u8]) -> u16 {
        self.update(self.init, bytes)
    }
}

pub static HEADER_CRC: Crc8 = Crc8::new(&CRC_HEADER_ALG);
pub static PAYLOAD_CRC: Crc16 = Crc16::new(&CRC_PAYLOAD_ALG);

#[cfg(test)]
mod tests {
    use super::*;

    /// Bitwise reference implementation.
    fn crc16_bitwise(poly: u16, bytes: &[u8]) -> u16 {
        let mut crc = 0u16;
        for &byte in bytes {
            crc ^= (byte as u16) << 8;
            for _ in 0..8 {
                crc = if crc & 0x8000 != 0 {
                    (crc << 1) ^ poly
                } else {
                    crc << 1
                };
            }
        }
        crc
    }

    #[test]
    fn table_matches_bitwise() {
        let data = b"123456789 elementary stream";
        assert_eq!(
            PAYLOAD_CRC.checksum(data),
            crc16_bitwise(CRC_PAYLOAD_ALG.poly, data)
        );
    }

    #[test]
    fn crc8_detects_single_bit_flip() {
        let mut data = [0xF8, 0x7A, 0x10, 0x70, 0x00, 0x40];
        let crc = HEADER_CRC.checksum(&data);
        data[3] ^= 0x01;
        assert_ne!(HEADER_CRC.checksum(&data), crc);
    }

    #[test]
    fn crc8_appended_checksum_is_zero() {
        let mut data = vec![0xF8, 0x7A, 0x31, 0x80, 0x01, 0x00];
        let crc = HEADER_CRC.checksum(&data);
        data.push(crc);
        assert_eq!(HEADER_CRC.checksum(&data), 0);
    }
}

// LZ-String dictionary coder over UTF-16 code units, packed 16 bits per
// output unit. This is the compression behind every token ever shared, so
// the bit layout is fixed:
//
//   - bits are written MSB-first into each 16-bit unit
//   - a code of `n` bits is written least-significant bit first
//   - codes 0 and 1 introduce an 8-bit or 16-bit literal, code 2 ends the
//     stream, dictionary entries start at 3
//   - code width starts at 2 bits (3 on the read side, which lags one entry)
//     and grows by one each time the window of new codes runs out

use std::collections::{HashMap, HashSet};

const UNIT_BITS: u32 = 16;

const LITERAL_8: u32 = 0;
const LITERAL_16: u32 = 1;
const END_OF_STREAM: u32 = 2;

#[derive(Default)]
struct BitWriter {
    value: u32,
    position: u32,
    out: Vec<u16>,
}

impl BitWriter {
    fn write_bit(&mut self, bit: u32) {
        self.value = (self.value << 1) | bit;
        if self.position == UNIT_BITS - 1 {
            self.position = 0;
            self.out.push(self.value as u16);
            self.value = 0;
        } else {
            self.position += 1;
        }
    }

    fn write_bits(&mut self, mut value: u32, count: u32) {
        for _ in 0..count {
            self.write_bit(value & 1);
            value >>= 1;
        }
    }

    // Always pads, even when the last unit is already full.
    fn finish(mut self) -> Vec<u16> {
        loop {
            self.value <<= 1;
            if self.position == UNIT_BITS - 1 {
                self.out.push(self.value as u16);
                return self.out;
            }
            self.position += 1;
        }
    }
}

struct Compressor {
    dictionary: HashMap<Vec<u16>, u32>,
    // single units added to the dictionary but not yet written as literals
    pending: HashSet<u16>,
    enlarge_in: u32,
    dict_size: u32,
    num_bits: u32,
    writer: BitWriter,
}

impl Compressor {
    fn new() -> Self {
        Self {
            dictionary: HashMap::new(),
            pending: HashSet::new(),
            enlarge_in: 2,
            dict_size: 3,
            num_bits: 2,
            writer: BitWriter::default(),
        }
    }

    fn shrink_window(&mut self) {
        self.enlarge_in -= 1;
        if self.enlarge_in == 0 {
            self.enlarge_in = 1 << self.num_bits;
            self.num_bits += 1;
        }
    }

    fn emit(&mut self, w: &[u16]) {
        if w.len() == 1 && self.pending.remove(&w[0]) {
            let unit = w[0];
            if unit < 256 {
                self.writer.write_bits(LITERAL_8, self.num_bits);
                self.writer.write_bits(u32::from(unit), 8);
            } else {
                self.writer.write_bits(LITERAL_16, self.num_bits);
                self.writer.write_bits(u32::from(unit), 16);
            }
            self.shrink_window();
        } else {
            let code = self.dictionary[w];
            self.writer.write_bits(code, self.num_bits);
        }
        self.shrink_window();
    }

    fn run(mut self, input: &[u16]) -> Vec<u16> {
        let mut w: Vec<u16> = Vec::new();
        for &c in input {
            if !self.dictionary.contains_key([c].as_slice()) {
                self.dictionary.insert(vec![c], self.dict_size);
                self.dict_size += 1;
                self.pending.insert(c);
            }

            let mut wc = w.clone();
            wc.push(c);
            if self.dictionary.contains_key(&wc) {
                w = wc;
            } else {
                self.emit(&w);
                self.dictionary.insert(wc, self.dict_size);
                self.dict_size += 1;
                w = vec![c];
            }
        }
        if !w.is_empty() {
            self.emit(&w);
        }
        self.writer.write_bits(END_OF_STREAM, self.num_bits);
        self.writer.finish()
    }
}

pub fn compress(input: &[u16]) -> Vec<u16> {
    Compressor::new().run(input)
}

struct BitReader<'a> {
    units: &'a [u16],
    index: usize,
    value: u16,
    mask: u16,
}

impl<'a> BitReader<'a> {
    fn new(units: &'a [u16]) -> Self {
        Self {
            units,
            index: 1,
            value: units.first().copied().unwrap_or(0),
            mask: 1 << (UNIT_BITS - 1),
        }
    }

    // Past the end the stream reads as zeros; `exhausted` is how callers
    // notice a truncated input.
    fn read_bits(&mut self, count: u32) -> u32 {
        let mut bits = 0;
        for shift in 0..count {
            let bit = u32::from(self.value & self.mask != 0);
            self.mask >>= 1;
            if self.mask == 0 {
                self.mask = 1 << (UNIT_BITS - 1);
                self.value = self.units.get(self.index).copied().unwrap_or(0);
                self.index += 1;
            }
            bits |= bit << shift;
        }
        bits
    }

    fn exhausted(&self) -> bool {
        self.index > self.units.len()
    }
}

/// Inverse of [`compress`]. `None` means the stream is corrupt or truncated.
pub fn decompress(units: &[u16]) -> Option<Vec<u16>> {
    if units.is_empty() {
        return None;
    }
    let mut reader = BitReader::new(units);
    // codes 0..=2 are control codes; keep their slots so indices line up
    let mut dictionary: Vec<Vec<u16>> = vec![Vec::new(), Vec::new(), Vec::new()];
    let mut enlarge_in: u32 = 4;
    let mut num_bits: u32 = 3;

    let first = match reader.read_bits(2) {
        LITERAL_8 => reader.read_bits(8) as u16,
        LITERAL_16 => reader.read_bits(16) as u16,
        END_OF_STREAM => return Some(Vec::new()),
        _ => return None,
    };
    dictionary.push(vec![first]);
    let mut w = vec![first];
    let mut result = w.clone();

    loop {
        if reader.exhausted() {
            return None;
        }

        let mut code = reader.read_bits(num_bits) as usize;
        match code as u32 {
            LITERAL_8 | LITERAL_16 => {
                let width = if code as u32 == LITERAL_8 { 8 } else { 16 };
                let unit = reader.read_bits(width) as u16;
                dictionary.push(vec![unit]);
                code = dictionary.len() - 1;
                enlarge_in -= 1;
            }
            END_OF_STREAM => return Some(result),
            _ => {}
        }

        if enlarge_in == 0 {
            enlarge_in = 1 << num_bits;
            num_bits += 1;
        }

        let entry = if code < dictionary.len() {
            dictionary[code].clone()
        } else if code == dictionary.len() {
            let mut entry = w.clone();
            entry.push(w[0]);
            entry
        } else {
            return None;
        };
        result.extend_from_slice(&entry);

        let mut grown = w;
        grown.push(entry[0]);
        dictionary.push(grown);
        enlarge_in -= 1;
        w = entry;

        if enlarge_in == 0 {
            enlarge_in = 1 << num_bits;
            num_bits += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    fn round_trip(s: &str) -> String {
        let packed = compress(&units(s));
        String::from_utf16(&decompress(&packed).unwrap()).unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(compress(&[]), vec![0x4000]);
        assert_eq!(decompress(&[0x4000]), Some(Vec::new()));
    }

    #[test]
    fn test_round_trips() {
        for s in [
            "a",
            "ab",
            "aaaaaaaaaa",
            "abababababababab",
            r#"{"velocity":0},{"velocity":0},{"velocity":1}"#,
            "héllo ☃ 𝄞 wörld wörld",
        ] {
            assert_eq!(round_trip(s), s);
        }
    }

    #[test]
    fn test_repetition_compresses() {
        let text = r#"{"velocity":0},"#.repeat(64);
        let packed = compress(&units(&text));
        assert!(packed.len() * 4 < text.len());
    }

    #[test]
    fn test_corrupt_streams() {
        assert_eq!(decompress(&[]), None);
        // first code 3 is not a valid opener
        assert_eq!(decompress(&[0xFFFF]), None);
        // a literal with no terminator runs off the end
        let mut packed = compress(&units("drum machine"));
        packed.truncate(1);
        assert_eq!(decompress(&packed), None);
    }
}

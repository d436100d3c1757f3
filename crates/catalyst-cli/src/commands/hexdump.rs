//! Raw bytes at the end of a chain.
//!
//! ```text
//! 0x1A2B3C000: 48 65 6C 6C 6F 20 57 6F  72 6C 64 00 00 00 00 00  |Hello World.....|
//! ```

use anyhow::Result;
use catalyst::{Config, PointerChain, ReadMemory};

use super::attach;

pub fn run(
    config: &Config,
    pid: Option<u32>,
    chain: &PointerChain,
    size: usize,
    ascii: bool,
) -> Result<()> {
    let game = attach(config, pid)?;
    let memory = game.memory();

    let address = chain.resolve(&memory)?;
    let bytes = memory.read_bytes(address, size)?;

    println!("{} => {:#X} ({} bytes)", chain, address, size);
    println!();
    for line in format_hexdump(address, &bytes, ascii) {
        println!("{}", line);
    }
    Ok(())
}

fn format_hexdump(address: u64, bytes: &[u8], ascii: bool) -> Vec<String> {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(i, chunk)| {
            let mut line = format!("{:#X}: ", address + (i * 16) as u64);

            for j in 0..16 {
                if j == 8 {
                    line.push(' ');
                }
                match chunk.get(j) {
                    Some(byte) => line.push_str(&format!("{:02X} ", byte)),
                    None => line.push_str("   "),
                }
            }

            if ascii {
                let text: String = chunk
                    .iter()
                    .map(|&b| if (0x20..0x7F).contains(&b) { b as char } else { '.' })
                    .collect();
                line.push_str(&format!(" |{:<16}|", text));
            }

            line.trim_end().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_line() {
        let lines = format_hexdump(0x1000, b"Hello World\0\0\0\0\0", true);
        assert_eq!(
            lines,
            vec!["0x1000: 48 65 6C 6C 6F 20 57 6F  72 6C 64 00 00 00 00 00  |Hello World.....|"]
        );
    }

    #[test]
    fn test_partial_line_is_padded() {
        let lines = format_hexdump(0x2000, &[0x41; 18], true);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("0x2010: 41 41 "));
        assert!(lines[1].ends_with("|AA              |"));
    }

    #[test]
    fn test_without_ascii() {
        let lines = format_hexdump(0x0, &[0xFF, 0x00], false);
        assert_eq!(lines, vec!["0x0: FF 00"]);
    }
}

use crate::assembler::Image;
use crate::error::{Error, Result};
use qcore::disassemble;

pub const DEFAULT_DEPTH: usize = 256;

/// Output file name with a `.mif` suffix appended when missing.
pub fn mif_path(name: &str) -> String {
    if name.ends_with(".mif") {
        name.to_string()
    } else {
        format!("{}.mif", name)
    }
}

/// Render the image as an Intel/Altera memory initialization file.
pub fn render_mif(image: &Image, depth: usize) -> Result<String> {
    if image.len() > depth {
        return Err(Error::ImageTooLarge {
            size: image.len(),
            depth,
        }
        .at(0, 0));
    }

    let mut out = String::new();
    out.push_str("WIDTH = 16;\n");
    out.push_str(&format!("DEPTH = {};\n", depth));
    out.push_str("ADDRESS_RADIX = HEX;\n");
    out.push_str("DATA_RADIX = HEX;\n\n");
    out.push_str("CONTENT\n");
    out.push_str("BEGIN\n");
    for (addr, word, data) in image.iter() {
        let comment = if data {
            format!("data 0x{:04x}", word)
        } else {
            disassemble(word, addr).to_string()
        };
        out.push_str(&format!("{:>3x}    : {:04x};        % {} %\n", addr, word, comment));
    }
    if image.len() < depth {
        out.push_str(&format!("[{:x}..{:x}] : 0000;\n", image.len(), depth - 1));
    }
    out.push_str("END;\n");
    Ok(out)
}

/// Render and write to `path` (suffixed with `.mif` if needed). Returns the
/// name actually written.
pub fn write_mif(image: &Image, path: &str, depth: usize) -> Result<String> {
    let path = mif_path(path);
    let text = render_mif(image, depth)?;
    std::fs::write(&path, text).map_err(|err| Error::Io(path.clone(), err.to_string()).at(0, 0))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(words: &[u16], is_data: &[bool]) -> Image {
        Image {
            words: words.to_vec(),
            is_data: is_data.to_vec(),
        }
    }

    #[test]
    fn suffix() {
        assert_eq!(mif_path("a.mif"), "a.mif");
        assert_eq!(mif_path("out"), "out.mif");
        assert_eq!(mif_path("out.hex"), "out.hex.mif");
    }

    #[test]
    fn layout() {
        let img = image(&[0x3012, 0xE080, 0x0041], &[false, false, true]);
        let text = render_mif(&img, 16).unwrap();
        let expected = "\
WIDTH = 16;
DEPTH = 16;
ADDRESS_RADIX = HEX;
DATA_RADIX = HEX;

CONTENT
BEGIN
  0    : 3012;        % mvt r0, #0x12 %
  1    : e080;        % halt %
  2    : 0041;        % data 0x0041 %
[3..f] : 0000;
END;
";
        assert_eq!(text, expected);
    }

    #[test]
    fn full_image_has_no_fill() {
        let text = render_mif(&image(&[1, 2], &[true, true]), 2).unwrap();
        assert!(!text.contains(".."));
        assert!(text.ends_with("  1    : 0002;        % data 0x0002 %\nEND;\n"));
    }

    #[test]
    fn too_large() {
        let err = render_mif(&image(&[0; 3], &[true; 3]), 2).unwrap_err();
        assert_eq!(err.error, Error::ImageTooLarge { size: 3, depth: 2 });
    }
}

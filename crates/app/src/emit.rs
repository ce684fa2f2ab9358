//! C++ array emission for linking blobs into firmware.
//!
//! The blob is rendered as a `const uint8_t NAME_DATA[N]` definition plus a
//! matching `extern` declaration, both inside `namespace animation`.

use std::path::Path;

use anyhow::Context;

/// Items per line in the array body.
const LINE_ITEMS: usize = 64;

/// Declaration lines for the header file.
pub fn header_lines(symbol: &str, len: usize) -> Vec<String> {
    vec![
        "namespace animation {".to_string(),
        format!("    extern const uint8_t {symbol}_DATA[{len}];"),
        "}".to_string(),
    ]
}

/// Definition lines for the source file.
pub fn source_lines(symbol: &str, data: &[u8]) -> Vec<String> {
    let mut lines = Vec::with_capacity(data.len() / LINE_ITEMS + 4);
    lines.push("namespace animation {".to_string());
    lines.push(format!("    const uint8_t {symbol}_DATA[{}] = {{", data.len()));
    for chunk in data.chunks(LINE_ITEMS) {
        let mut line = String::from("        ");
        for byte in chunk {
            line.push_str(&format!("0x{byte:02x}, "));
        }
        lines.push(line.trim_end().to_string());
    }
    lines.push("    };".to_string());
    lines.push("}".to_string());
    lines
}

/// Write `<path>` (definition) and `<path>.hpp` (declaration).
pub fn write_c_source(path: &Path, symbol: &str, data: &[u8]) -> anyhow::Result<()> {
    let header_path = path.with_extension("hpp");

    let mut header = vec![
        "#pragma once".to_string(),
        String::new(),
        "#include <cstdint>".to_string(),
        String::new(),
    ];
    header.extend(header_lines(symbol, data.len()));

    let include = header_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut source = vec![format!("#include \"{include}\""), String::new()];
    source.extend(source_lines(symbol, data));

    std::fs::write(&header_path, header.join("\n") + "\n")
        .with_context(|| format!("writing {}", header_path.display()))?;
    std::fs::write(path, source.join("\n") + "\n")
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

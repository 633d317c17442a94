// Input reading: file paths or `-` for stdin, decoded to UTF-8.

use std::io::Read;
use std::path::Path;

use crate::CliError;

/// Read one merge input. `-` means stdin; anything else is a file path.
/// Returns the decoded content and a label for diagnostics.
pub fn read_input(arg: &str) -> Result<(String, String), CliError> {
    if arg == "-" {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .map_err(|e| CliError::io(format!("stdin: {}", e)))?;
        Ok((decode_utf8(bytes), "stdin".to_string()))
    } else {
        let path = Path::new(arg);
        let content = read_file_as_utf8(path)
            .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
        Ok((content, arg.to_string()))
    }
}

/// Read a file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;
    Ok(decode_utf8(bytes))
}

fn decode_utf8(bytes: Vec<u8>) -> String {
    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    }
}

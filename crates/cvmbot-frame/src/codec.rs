/// Separator between an element's length prefix and its value.
pub const LENGTH_DELIMITER: u8 = b'.';

/// Separator between elements.
pub const ELEMENT_SEPARATOR: u8 = b',';

/// Instruction terminator.
pub const TERMINATOR: u8 = b';';

/// Encode a list of elements into one wire instruction.
///
/// Wire format:
/// ```text
/// ┌──────────┬───┬──────────┬───┬─────┬───┐
/// │ <len>.v0 │ , │ <len>.v1 │ , │ ... │ ; │
/// └──────────┴───┴──────────┴───┴─────┴───┘
/// ```
///
/// `<len>` is the UTF-8 byte length of the value, not its character count.
/// Values are written verbatim; the length prefix makes embedded `,`, `;` and
/// `.` harmless.
pub fn encode<S: AsRef<str>>(elements: &[S]) -> String {
    let capacity = elements
        .iter()
        .map(|e| e.as_ref().len() + 12)
        .sum::<usize>()
        + 1;
    let mut out = String::with_capacity(capacity);

    for (index, element) in elements.iter().enumerate() {
        let element = element.as_ref();
        if index > 0 {
            out.push(ELEMENT_SEPARATOR as char);
        }
        out.push_str(&element.len().to_string());
        out.push(LENGTH_DELIMITER as char);
        out.push_str(element);
    }
    out.push(TERMINATOR as char);
    out
}

/// Decode one wire instruction into its elements.
///
/// Scans by byte offset. Decoding never fails: malformed input yields the
/// elements that were fully specified before the problem, which is the empty
/// list for garbage. Scanning stops at the first `;` even if bytes remain, and
/// a missing `;` at the end of the input is tolerated.
///
/// Values are sliced by their declared byte length and then reinterpreted as
/// UTF-8; a slice that splits a multi-byte sequence is decoded lossily.
pub fn decode(src: &[u8]) -> Vec<String> {
    let mut elements = Vec::new();
    let mut pos = 0usize;

    while pos < src.len() {
        let Some(dot) = src[pos..]
            .iter()
            .position(|&b| b == LENGTH_DELIMITER)
            .map(|offset| pos + offset)
        else {
            break;
        };

        let Some(len) = parse_length(&src[pos..dot]) else {
            tracing::trace!(offset = pos, "invalid length prefix, stopping decode");
            break;
        };

        let start = dot + 1;
        let end = match start.checked_add(len) {
            Some(end) if end <= src.len() => end,
            _ => {
                tracing::trace!(
                    offset = pos,
                    declared = len,
                    available = src.len() - start,
                    "truncated element, stopping decode"
                );
                break;
            }
        };

        elements.push(String::from_utf8_lossy(&src[start..end]).into_owned());
        pos = end;

        match src.get(pos) {
            Some(&ELEMENT_SEPARATOR) => pos += 1,
            Some(&TERMINATOR) | None => break,
            Some(&other) => {
                tracing::trace!(offset = pos, byte = other, "unexpected separator, stopping decode");
                break;
            }
        }
    }

    elements
}

fn parse_length(digits: &[u8]) -> Option<usize> {
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

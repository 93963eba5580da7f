// `<[u8]>::trim_ascii_start` needs a newer compiler than we support
pub(crate) fn trim_ascii_start(buf: &[u8]) -> &[u8] {
    if let Some(pos) = buf.iter().position(|b| !b.is_ascii_whitespace()) {
        &buf[pos..]
    } else {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim() {
        assert_eq!(trim_ascii_start(b" \n\tE 1"), b"E 1");
        assert_eq!(trim_ascii_start(b"  "), b"");
    }
}

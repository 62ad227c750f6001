//! 类型标识 <-> 文件名 的可逆编码
//!
//! 采用百分号转义：`%` 本身、路径分隔符、Windows 保留字符、控制字符，
//! 以及开头的 `.`（避免生成隐藏文件或 `..`）都会被写成 `%XX`。
//! 其他字符（包括非 ASCII）原样保留，解码是编码的严格逆运算。

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed escape in file name \"{0}\"")]
pub struct DecodeError(pub String);

fn needs_escape(c: char, position: usize) -> bool {
    matches!(c, '%' | '/' | '\\' | ':' | '<' | '>' | '"' | '|' | '?' | '*')
        || c.is_control()
        || (position == 0 && c == '.')
}

pub fn encode_type_name(type_id: &str) -> String {
    let mut encoded = String::with_capacity(type_id.len());
    for (position, c) in type_id.chars().enumerate() {
        if needs_escape(c, position) {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                encoded.push_str(&format!("%{:02X}", byte));
            }
        } else {
            encoded.push(c);
        }
    }
    encoded
}

pub fn decode_type_name(encoded: &str) -> Result<String, DecodeError> {
    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut idx = 0;

    while idx < bytes.len() {
        if bytes[idx] == b'%' {
            let hex = bytes
                .get(idx + 1..idx + 3)
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
                .ok_or_else(|| DecodeError(encoded.to_string()))?;
            let value =
                u8::from_str_radix(hex, 16).map_err(|_| DecodeError(encoded.to_string()))?;
            decoded.push(value);
            idx += 3;
        } else {
            decoded.push(bytes[idx]);
            idx += 1;
        }
    }

    String::from_utf8(decoded).map_err(|_| DecodeError(encoded.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_type_names_stay_readable() {
        assert_eq!(encode_type_name("public.utf8-plain-text"), "public.utf8-plain-text");
        assert_eq!(encode_type_name("text/plain;charset=utf-8"), "text%2Fplain;charset=utf-8");
        assert_eq!(encode_type_name("HTML Format"), "HTML Format");
    }

    #[test]
    fn escapes_separator_percent_and_leading_dot() {
        assert_eq!(encode_type_name("a%2Fb"), "a%252Fb");
        assert_eq!(encode_type_name(".."), "%2E.");
        assert_eq!(encode_type_name("C:\\x"), "C%3A%5Cx");
        assert_eq!(decode_type_name("a%252Fb").as_deref(), Ok("a%2Fb"));
        assert_eq!(decode_type_name("%2E.").as_deref(), Ok(".."));
    }

    #[test]
    fn rejects_truncated_or_invalid_escapes() {
        assert!(decode_type_name("abc%2").is_err());
        assert!(decode_type_name("abc%zz").is_err());
        assert!(decode_type_name("%FF").is_err());
    }
}

// Property tests for the type identifier <-> file name encoding
use clipslots::slots::{decode_type_name, encode_type_name};
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_encoding_is_reversible(type_id in any::<String>()) {
        let encoded = encode_type_name(&type_id);
        prop_assert_eq!(decode_type_name(&encoded), Ok(type_id));
    }

    #[test]
    fn test_encoded_names_are_safe_file_names(type_id in any::<String>()) {
        let encoded = encode_type_name(&type_id);
        prop_assert!(!encoded.contains('/'));
        prop_assert!(!encoded.contains('\\'));
        prop_assert!(!encoded.starts_with('.'));
        prop_assert!(!encoded.chars().any(char::is_control));
    }

    #[test]
    fn test_escape_lookalikes_survive(prefix in "[a-z.]{0,8}", hex in "[0-9A-F]{2}") {
        // 原文中已有的 %XX 不能在解码时被误当成转义
        let type_id = format!("{}%{}", prefix, hex);
        let encoded = encode_type_name(&type_id);
        prop_assert_eq!(decode_type_name(&encoded), Ok(type_id));
    }

    #[test]
    fn test_distinct_ids_never_collide(a in "\\PC{0,12}", b in "\\PC{0,12}") {
        prop_assume!(a != b);
        prop_assert_ne!(encode_type_name(&a), encode_type_name(&b));
    }
}

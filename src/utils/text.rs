//! 日志文本处理工具

/// 按字符截断，超出部分以 `...` 结尾
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// 遮蔽手机号中间位，保留前 3 位与后 4 位
///
/// 位数不足 8 时只保留最后 2 位。
pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    let len = chars.len();
    if len == 0 {
        return String::new();
    }

    let (head, tail) = if len >= 8 { (3, 4) } else { (0, len.min(2)) };
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i < head || i >= len - tail {
                *c
            } else {
                '*'
            }
        })
        .collect()
}

/// 按配置决定是否遮蔽手机号
pub fn display_phone(phone: &str, mask: bool) -> String {
    if mask {
        mask_phone(phone)
    } else {
        phone.to_string()
    }
}

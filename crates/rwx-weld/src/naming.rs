//! Native-to-Ruby name conversions

/// Strip the toolkit prefix (`wx`/`WX`) from a native name
pub fn rb_wx_name(name: &str) -> String {
    let stripped = name
        .strip_prefix("wx")
        .or_else(|| name.strip_prefix("WX"))
        .unwrap_or(name);
    if stripped.is_empty() {
        name.to_string()
    } else {
        stripped.to_string()
    }
}

/// Convert CamelCase to snake_case, keeping acronym runs together
pub fn underscore(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = if i > 0 { Some(chars[i - 1]) } else { None };
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary && !result.ends_with('_') {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}

/// Ruby method name for a native method name
pub fn rb_method_name(name: &str) -> String {
    underscore(name)
}

/// Ruby class name for a native class (`wxFrame` -> `Frame`)
pub fn rb_class_name(name: &str) -> String {
    let base = name.rsplit("::").next().unwrap_or(name);
    rb_wx_name(base)
}

/// Ruby constant name for a global (`wxNullBitmap` -> `NULL_BITMAP`)
pub fn rb_constant_name(name: &str) -> String {
    let plain = rb_wx_name(name);
    if plain.chars().all(|c| !c.is_ascii_lowercase()) {
        plain
    } else {
        underscore(&plain).to_uppercase()
    }
}

/// Ruby expression for a native constant argument
pub fn rb_constant_value(arg: &str) -> String {
    let arg = arg.trim();
    if arg.is_empty() {
        return String::new();
    }
    if arg.chars().next().is_some_and(|c| c.is_ascii_digit() || c == '-') {
        return arg.to_string();
    }
    match arg {
        "true" | "false" => arg.to_string(),
        "NULL" | "nullptr" => "nil".to_string(),
        _ if arg.starts_with("wx") => format!("Wx::{}", rb_wx_name(arg)),
        _ => arg.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underscore() {
        assert_eq!(underscore("SetTitle"), "set_title");
        assert_eq!(underscore("GetHTMLText"), "get_html_text");
        assert_eq!(underscore("IsOk"), "is_ok");
        assert_eq!(underscore("already_snake"), "already_snake");
        assert_eq!(underscore("Get2DPoint"), "get2_d_point");
    }

    #[test]
    fn test_rb_names() {
        assert_eq!(rb_wx_name("wxFrame"), "Frame");
        assert_eq!(rb_wx_name("wx"), "wx");
        assert_eq!(rb_class_name("wxGrid::wxGridSelectionModes"), "GridSelectionModes");
        assert_eq!(rb_constant_name("wxNullBitmap"), "NULL_BITMAP");
        assert_eq!(rb_constant_name("wxID_ANY"), "ID_ANY");
    }

    #[test]
    fn test_rb_constant_value() {
        assert_eq!(rb_constant_value(" wxSYS_COLOUR_WINDOW "), "Wx::SYS_COLOUR_WINDOW");
        assert_eq!(rb_constant_value("-1"), "-1");
        assert_eq!(rb_constant_value("NULL"), "nil");
    }
}

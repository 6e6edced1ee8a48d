//! Conventional accessor naming.

/// Uppercases the first character when it is an ASCII letter; any other
/// first character is left as is.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(name.len());
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

pub fn getter_name(field: &str) -> String {
    format!("get{}", capitalize(field))
}

pub fn setter_name(field: &str) -> String {
    format!("set{}", capitalize(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_ascii_only() {
        assert_eq!(capitalize("name"), "Name");
        assert_eq!(capitalize("Name"), "Name");
        assert_eq!(capitalize("_id"), "_id");
        assert_eq!(capitalize("2fa"), "2fa");
        assert_eq!(capitalize("émile"), "émile");
        assert_eq!(capitalize("x"), "X");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn builds_accessor_names() {
        assert_eq!(getter_name("tags"), "getTags");
        assert_eq!(setter_name("tags"), "setTags");
        assert_eq!(setter_name("$raw"), "set$raw");
    }
}

// Helpers for building CQL query strings for the circulation backend.

// escapes CQL masking characters so scanned input is always matched literally
pub(crate) fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '*' | '?' | '^') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub(crate) fn exact(index: &str, value: &str) -> String {
    format!("{}==\"{}\"", index, escape(value))
}

// right-truncated match, `value*`
pub(crate) fn prefix(index: &str, value: &str) -> String {
    format!("{}==\"{}*\"", index, escape(value))
}

pub(crate) fn any_of(clauses: &[String]) -> String {
    format!("({})", clauses.join(" or "))
}

pub(crate) fn all_of(clauses: &[String]) -> String {
    format!("({})", clauses.join(" and "))
}

#[cfg(test)]
mod tests {
    use crate::utils::cql::{all_of, any_of, escape, exact, prefix};

    #[tokio::test]
    async fn test_should_escape_masking_characters() {
        assert_eq!(r#"a\"b\*c\?d\^e\\f"#, escape(r#"a"b*c?d^e\f"#).as_str());
    }

    #[tokio::test]
    async fn test_should_build_clauses() {
        assert_eq!(r#"barcode=="123""#, exact("barcode", "123").as_str());
        assert_eq!(r#"barcode=="12\*3*""#, prefix("barcode", "12*3").as_str());
        assert_eq!(r#"(a or b)"#, any_of(&["a".to_string(), "b".to_string()]).as_str());
        assert_eq!(r#"(a and b)"#, all_of(&["a".to_string(), "b".to_string()]).as_str());
    }
}
